//! Median Price: computes a consensus spot price for currency pairs by asking
//! several exchanges and aggregators, discarding quotes that deviate more than
//! 50% from the median, and reporting the median of the rest.
//!
//! Usage example (CLI):
//! ```bash
//! price_median --pairs BTC/USD eth/usdt --symbols ./static_symbols.json
//! ```
//!
//! Without `--pairs` or `--path` the pairs are read from stdin as a
//! space-separated list. The symbol mapping artifact is produced by
//! `price_mapper`; when it is missing, the sources that need it report
//! themselves unavailable and the others still answer.
#![warn(missing_docs)]
mod args;
mod report;
mod sources;

use crate::args::Args;
use crate::sources::{SourceContext, SourceKind};
use clap::Parser;
use log::{debug, info, warn};
use price_common::pair::{PairParser, parse_pairs};
use price_common::{CanonicalPair, FetchMode, PriceAggregator, PriceError, Result, SymbolTables};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;
use strum::IntoEnumIterator;

fn main() -> Result<(), PriceError> {
    let dotenv = dotenvy::dotenv();
    init_logger();
    if let Err(e) = dotenv {
        debug!("No .env file loaded: {}", e);
    }
    let args = Args::parse();

    let tables = load_tables(&args.symbols);
    let client = sources::http::build_client(Duration::from_secs(args.timeout_secs))?;
    let context = SourceContext::new(client, tables, args.cmc_api_key.clone());
    let kinds: Vec<SourceKind> = if args.sources.is_empty() {
        SourceKind::iter().collect()
    } else {
        args.sources.clone()
    };
    let mode = if args.parallel {
        FetchMode::Parallel
    } else {
        FetchMode::Sequential
    };
    let aggregator = PriceAggregator::new(context.sources(&kinds)).with_mode(mode);
    info!("Sources: {}", aggregator.source_names().join(", "));

    let text_output = !args.json;
    if text_output {
        report::print_banner();
    }
    let (pairs, shutdown) = prepare_batch(|| read_pairs(&args, text_output), install_ctrlc)?;
    if pairs.is_empty() {
        warn!("No valid symbol pairs were given");
    }
    if text_output {
        report::print_pairs(&pairs);
    }

    let batch = aggregator.run_with(&pairs, &shutdown, |index, pair_report| {
        if text_output {
            report::print_pair_report(index, pair_report);
        }
    });

    if text_output {
        report::print_summary(&batch);
    } else {
        println!("{}", report::summary_json(&batch)?);
    }
    Ok(())
}

/// Reads the pairs, then arms the shutdown flag for the pricing phase.
///
/// Until `read` returns the default SIGINT behavior is untouched, so Ctrl+C at
/// the prompt ends the process at once.
fn prepare_batch<R, H>(read: R, arm: H) -> Result<(Vec<CanonicalPair>, Arc<AtomicBool>), PriceError>
where
    R: FnOnce() -> Result<Vec<CanonicalPair>, PriceError>,
    H: FnOnce(Arc<AtomicBool>) -> Result<(), PriceError>,
{
    let pairs = read()?;
    let shutdown = Arc::new(AtomicBool::new(false));
    arm(shutdown.clone())?;
    Ok((pairs, shutdown))
}

fn install_ctrlc(shutdown: Arc<AtomicBool>) -> Result<(), PriceError> {
    ctrlc::set_handler(move || {
        info!("Ctrl+C received. Finishing the current pair...");
        shutdown.store(true, Ordering::SeqCst);
    })
    .map_err(|e| PriceError::Format(format!("Error setting Ctrl+C handler: {e}")))
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

/// Loads the mapping artifact, falling back to empty tables so that sources
/// which need no translation still answer.
fn load_tables(path: &Path) -> SymbolTables {
    match SymbolTables::load(path) {
        Ok(tables) => tables,
        Err(e) => {
            warn!(
                "Can not load symbol tables from {}: {}. \
                 CoinGecko, CoinMarketCap and Kraken will be unavailable.",
                path.display(),
                e
            );
            SymbolTables::default()
        }
    }
}

/// Pairs from `--pairs`, from the `--path` file, or typed on stdin.
fn read_pairs(args: &Args, prompt: bool) -> Result<Vec<CanonicalPair>, PriceError> {
    if !args.pairs.is_empty() {
        return Ok(args.pairs.clone());
    }

    if let Some(raw) = &args.path {
        let file_path = normalize_path(raw);
        if !is_file_exist(&file_path) {
            return Err(PriceError::Format(format!(
                "Pairs file not found: {}",
                file_path.display()
            )));
        }
        let file = File::open(&file_path)?;
        let pairs = CanonicalPair::parse_from_file(BufReader::new(file))?;
        info!("Read {} pair(s) from {}", pairs.len(), file_path.display());
        return Ok(pairs);
    }

    if prompt {
        print!("Enter the list of symbol separated by space: ");
        io::stdout().flush()?;
    }
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(parse_pairs(&line))
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}

/// Returns `true` if the provided path exists and is a regular file.
fn is_file_exist(path: &Path) -> bool {
    path.exists() && path.is_file()
}
