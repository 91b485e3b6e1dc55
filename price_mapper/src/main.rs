//! Symbol mapping builder.
//!
//! Downloads the full asset catalogs of CoinGecko, CoinMarketCap and Kraken,
//! resolves tickers listed several times, and writes the three ticker →
//! identifier tables to one JSON artifact read by `price_median`.
//!
//! Usage example (CLI):
//! ```bash
//! CMC_API_KEY=... price_mapper --output ./static_symbols.json
//! ```
//!
//! A catalog that cannot be downloaded is logged and its table left empty; the
//! run fails only when no catalog could be downloaded at all.
#![warn(missing_docs)]
mod args;
mod catalog;

use crate::args::Args;
use crate::catalog::CatalogClient;
use clap::Parser;
use log::{debug, error, info};
use price_common::{PriceError, Result, SymbolMapping, SymbolTables};
use std::time::Duration;

fn main() -> Result<(), PriceError> {
    let dotenv = dotenvy::dotenv();
    init_logger();
    if let Err(e) = dotenv {
        debug!("No .env file loaded: {}", e);
    }
    let args = Args::parse();

    let timeout = Duration::from_secs(args.timeout_secs);
    let catalogs = CatalogClient::new(timeout, args.cmc_api_key.clone())?;

    let mut built = 0;
    let mut tables = SymbolTables::default();
    if let Some(mapping) = keep("CoinGecko", catalogs.coingecko()) {
        tables.coingecko = mapping;
        built += 1;
    }
    if let Some(mapping) = keep("CoinMarketCap", catalogs.coinmarketcap()) {
        tables.coinmarketcap = mapping;
        built += 1;
    }
    if let Some(mapping) = keep("Kraken", catalogs.kraken()) {
        tables.kraken = mapping;
        built += 1;
    }

    if built == 0 {
        return Err(PriceError::Mapping("no catalog could be downloaded".to_string()));
    }
    tables.save(&args.output)?;
    info!("Created static symbol tables at {}", args.output.display());
    Ok(())
}

fn keep(source: &str, result: Result<SymbolMapping, PriceError>) -> Option<SymbolMapping> {
    match result {
        Ok(mapping) => {
            info!("{} table: {} tickers", source, mapping.len());
            Some(mapping)
        }
        Err(e) => {
            error!("{} table left empty: {}", source, e);
            None
        }
    }
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
