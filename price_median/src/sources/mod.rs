//! Price adapters, one per external source.
//!
//! Each adapter implements `PriceSource` and hides its own request shape and
//! identifier quirks:
//! - `binance` — base and quote concatenated (`BTCUSDT`).
//! - `coingecko` — base translated to a coin id, response keyed by that id.
//! - `coinmarketcap` — base translated to a numeric id, API key header.
//! - `kraken` — `BTC` renamed to `XBT`, both tickers translated to asset codes.
//! - `okx` — raw tickers joined as `BASE-QUOTE-SWAP`.
pub mod binance;
pub mod coingecko;
pub mod coinmarketcap;
pub mod http;
pub mod kraken;
pub mod okx;

use std::sync::Arc;

use clap::ValueEnum;
use price_common::{PriceSource, SymbolTables};
use reqwest::blocking::Client;
use strum_macros::{Display, EnumIter, EnumString};

use self::binance::Binance;
use self::coingecko::CoinGecko;
use self::coinmarketcap::CoinMarketCap;
use self::kraken::Kraken;
use self::okx::Okx;

/// Supported price sources.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, ValueEnum, Display, EnumString, EnumIter, Hash, Eq, PartialEq)]
#[clap(rename_all = "lower")]
#[strum(ascii_case_insensitive)]
pub enum SourceKind {
    Binance,
    CoinGecko,
    CoinMarketCap,
    Kraken,
    #[strum(serialize = "OKX")]
    Okx,
}

/// Shared, read-only state handed to every adapter.
pub struct SourceContext {
    client: Client,
    tables: Arc<SymbolTables>,
    cmc_api_key: Option<String>,
}

impl SourceContext {
    pub fn new(client: Client, tables: SymbolTables, cmc_api_key: Option<String>) -> Self {
        Self {
            client,
            tables: Arc::new(tables),
            cmc_api_key,
        }
    }

    /// Builds one adapter.
    pub fn source(&self, kind: SourceKind) -> Box<dyn PriceSource> {
        match kind {
            SourceKind::Binance => Box::new(Binance::new(self.client.clone())),
            SourceKind::CoinGecko => {
                Box::new(CoinGecko::new(self.client.clone(), self.tables.clone()))
            }
            SourceKind::CoinMarketCap => Box::new(CoinMarketCap::new(
                self.client.clone(),
                self.tables.clone(),
                self.cmc_api_key.clone(),
            )),
            SourceKind::Kraken => Box::new(Kraken::new(self.client.clone(), self.tables.clone())),
            SourceKind::Okx => Box::new(Okx::new(self.client.clone())),
        }
    }

    /// Builds the adapters for `kinds` in order, ignoring repeats.
    pub fn sources(&self, kinds: &[SourceKind]) -> Vec<Box<dyn PriceSource>> {
        let mut seen = Vec::new();
        kinds
            .iter()
            .filter(|kind| {
                if seen.contains(*kind) {
                    false
                } else {
                    seen.push(**kind);
                    true
                }
            })
            .map(|kind| self.source(*kind))
            .collect()
    }
}
