//! Command-line arguments for the median price calculator.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use clap::Parser;
use price_common::CanonicalPair;
use price_common::net::{CMC_API_KEY_ENV, DEFAULT_SYMBOLS_PATH, DEFAULT_TIMEOUT_SECS};
use std::path::PathBuf;

use crate::sources::SourceKind;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Pairs to price, e.g. `BTC/USD eth/usdt`.
    /// When neither `--pairs` nor `--path` is given, pairs are read from stdin.
    #[clap(long, num_args = 1.., value_delimiter = ',')]
    pub pairs: Vec<CanonicalPair>,

    /// Path to a text file with pairs.
    /// Pairs may be separated by commas, spaces, or new lines.
    #[clap(long, conflicts_with = "pairs")]
    pub path: Option<String>,

    /// Symbol mapping artifact written by `price_mapper`.
    #[clap(long, default_value = DEFAULT_SYMBOLS_PATH)]
    pub symbols: PathBuf,

    /// Sources to query. All sources are queried when omitted.
    #[clap(long, value_enum, num_args = 1.., value_delimiter = ',')]
    pub sources: Vec<SourceKind>,

    /// Per-request timeout in seconds.
    #[clap(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Query the sources of a pair concurrently.
    #[clap(long)]
    pub parallel: bool,

    /// Print the final summary as JSON instead of the text report.
    #[clap(long)]
    pub json: bool,

    /// CoinMarketCap API key. CoinMarketCap is skipped without it.
    #[clap(long, env = CMC_API_KEY_ENV, hide_env_values = true)]
    pub cmc_api_key: Option<String>,
}
