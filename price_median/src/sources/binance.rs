//! Binance spot ticker. Base and quote are concatenated without a separator.
use price_common::net::BINANCE_API;
use price_common::{CanonicalPair, PriceSource, SourceError};
use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;

use super::http;

const TICKER_PRICE_PATH: &str = "/api/v3/ticker/price";

/// `GET /api/v3/ticker/price` response.
#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: String,
}

/// Price adapter for Binance.
pub struct Binance {
    client: Client,
}

impl Binance {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// `BTC/USDT` becomes `BTCUSDT`.
    fn symbol(pair: &CanonicalPair) -> String {
        format!("{}{}", pair.base(), pair.quote())
    }

    fn request_url(base: &str, pair: &CanonicalPair) -> Result<Url, SourceError> {
        let symbol = Self::symbol(pair);
        http::request_url(base, TICKER_PRICE_PATH, &[("symbol", symbol.as_str())])
    }

    fn parse_price(body: &str) -> Result<f64, SourceError> {
        let ticker: TickerPrice = http::decode(body)?;
        http::parse_decimal(&ticker.price)
    }
}

impl PriceSource for Binance {
    fn name(&self) -> &str {
        "Binance"
    }

    fn fetch_price(&self, pair: &CanonicalPair) -> Result<f64, SourceError> {
        let url = Self::request_url(BINANCE_API, pair)?;
        let body = http::get_body(&self.client, url, &[])?;
        Self::parse_price(&body)
    }
}
