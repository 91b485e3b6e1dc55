//! Command-line arguments for the symbol mapping builder.
use clap::Parser;
use price_common::net::{CMC_API_KEY_ENV, DEFAULT_SYMBOLS_PATH, DEFAULT_TIMEOUT_SECS};
use std::path::PathBuf;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Where to write the symbol tables.
    #[clap(long, default_value = DEFAULT_SYMBOLS_PATH)]
    pub output: PathBuf,

    /// Per-request timeout in seconds.
    #[clap(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// CoinMarketCap API key. The CoinMarketCap table is left empty without it.
    #[clap(long, env = CMC_API_KEY_ENV, hide_env_values = true)]
    pub cmc_api_key: Option<String>,
}
