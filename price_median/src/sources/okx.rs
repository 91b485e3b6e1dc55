//! OKX perpetual swap ticker. Tickers are used as-is, joined into
//! `BASE-QUOTE-SWAP`.
use price_common::net::OKX_API;
use price_common::{CanonicalPair, PriceSource, SourceError};
use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;

use super::http;

const TICKER_PATH: &str = "/api/v5/market/ticker";
const INSTRUMENT_SUFFIX: &str = "SWAP";

#[derive(Debug, Deserialize)]
struct TickerResponse {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Vec<Ticker>,
}

#[derive(Debug, Deserialize)]
struct Ticker {
    last: String,
}

/// Price adapter for OKX.
pub struct Okx {
    client: Client,
}

impl Okx {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn instrument_id(pair: &CanonicalPair) -> String {
        format!("{}-{}-{}", pair.base(), pair.quote(), INSTRUMENT_SUFFIX)
    }

    fn request_url(base: &str, pair: &CanonicalPair) -> Result<Url, SourceError> {
        let instrument = Self::instrument_id(pair);
        http::request_url(base, TICKER_PATH, &[("instId", instrument.as_str())])
    }

    fn parse_price(body: &str) -> Result<f64, SourceError> {
        let response: TickerResponse = http::decode(body)?;
        if response.code != "0" {
            return Err(SourceError::Rejected(format!("code {}: {}", response.code, response.msg)));
        }
        let ticker = response
            .data
            .first()
            .ok_or_else(|| SourceError::MissingField("data[0].last".to_string()))?;
        http::parse_decimal(&ticker.last)
    }
}

impl PriceSource for Okx {
    fn name(&self) -> &str {
        "OKX"
    }

    fn fetch_price(&self, pair: &CanonicalPair) -> Result<f64, SourceError> {
        let url = Self::request_url(OKX_API, pair)?;
        let body = http::get_body(&self.client, url, &[])?;
        Self::parse_price(&body)
    }
}
