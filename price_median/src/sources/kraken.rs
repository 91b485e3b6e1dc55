//! Kraken public ticker.
//!
//! Kraken lists bitcoin as `XBT`, so `BTC` is renamed on both sides of the pair
//! before both tickers are translated to Kraken asset codes (`XBT` → `XXBT`,
//! `USD` → `ZUSD`). The response is keyed by the concatenated asset codes.
use std::collections::HashMap;
use std::sync::Arc;

use price_common::net::KRAKEN_API;
use price_common::{CanonicalPair, PriceSource, SourceError, SymbolMapping, SymbolTables};
use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;

use super::http;

const TICKER_PATH: &str = "/public/Ticker";

/// Tickers Kraken lists under a different name.
const ALIASES: &[(&str, &str)] = &[("BTC", "XBT")];

#[derive(Debug, Deserialize)]
struct TickerResponse {
    #[serde(default)]
    error: Vec<String>,
    #[serde(default)]
    result: HashMap<String, TickerInfo>,
}

#[derive(Debug, Deserialize)]
struct TickerInfo {
    /// Last trade closed: `[price, lot volume]`.
    c: Vec<String>,
}

/// Price adapter for Kraken.
pub struct Kraken {
    client: Client,
    tables: Arc<SymbolTables>,
}

impl Kraken {
    pub fn new(client: Client, tables: Arc<SymbolTables>) -> Self {
        Self { client, tables }
    }

    fn alias(ticker: &str) -> &str {
        ALIASES
            .iter()
            .find(|(canonical, _)| *canonical == ticker)
            .map(|(_, alias)| *alias)
            .unwrap_or(ticker)
    }

    fn asset_code<'a>(mapping: &'a SymbolMapping, ticker: &str) -> Result<&'a str, SourceError> {
        let ticker = Self::alias(ticker);
        mapping
            .get(ticker)
            .ok_or_else(|| SourceError::UnmappedTicker(ticker.to_string()))
    }

    /// Kraken pair name, e.g. `XXBTZUSD`.
    fn pair_code(mapping: &SymbolMapping, pair: &CanonicalPair) -> Result<String, SourceError> {
        let base = Self::asset_code(mapping, pair.base())?;
        let quote = Self::asset_code(mapping, pair.quote())?;
        Ok(format!("{base}{quote}"))
    }

    fn request_url(base: &str, pair_code: &str) -> Result<Url, SourceError> {
        http::request_url(base, TICKER_PATH, &[("pair", pair_code)])
    }

    fn parse_price(body: &str, pair_code: &str) -> Result<f64, SourceError> {
        let response: TickerResponse = http::decode(body)?;
        if !response.error.is_empty() {
            return Err(SourceError::Rejected(response.error.join(", ")));
        }
        let last = response
            .result
            .get(pair_code)
            .and_then(|ticker| ticker.c.first())
            .ok_or_else(|| SourceError::MissingField(format!("result.{pair_code}.c[0]")))?;
        http::parse_decimal(last)
    }
}

impl PriceSource for Kraken {
    fn name(&self) -> &str {
        "Kraken"
    }

    fn fetch_price(&self, pair: &CanonicalPair) -> Result<f64, SourceError> {
        let pair_code = Self::pair_code(&self.tables.kraken, pair)?;
        let url = Self::request_url(KRAKEN_API, &pair_code)?;
        let body = http::get_body(&self.client, url, &[])?;
        Self::parse_price(&body, &pair_code)
    }
}
