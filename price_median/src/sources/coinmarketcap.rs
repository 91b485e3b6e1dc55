//! CoinMarketCap latest quotes. The base ticker is translated to a CoinMarketCap
//! id; the quote currency is passed as `convert`. Requires an API key.
use std::collections::HashMap;
use std::sync::Arc;

use price_common::net::{CMC_API_KEY_HEADER, COINMARKETCAP_API};
use price_common::{CanonicalPair, PriceSource, SourceError, SymbolMapping, SymbolTables};
use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;

use super::http;

const QUOTES_LATEST_PATH: &str = "/v2/cryptocurrency/quotes/latest";

#[derive(Debug, Deserialize)]
struct QuotesLatest {
    data: HashMap<String, Asset>,
}

#[derive(Debug, Deserialize)]
struct Asset {
    quote: HashMap<String, ConvertedQuote>,
}

#[derive(Debug, Deserialize)]
struct ConvertedQuote {
    price: Option<f64>,
}

/// Price adapter for CoinMarketCap.
pub struct CoinMarketCap {
    client: Client,
    tables: Arc<SymbolTables>,
    api_key: Option<String>,
}

impl CoinMarketCap {
    pub fn new(client: Client, tables: Arc<SymbolTables>, api_key: Option<String>) -> Self {
        Self {
            client,
            tables,
            api_key,
        }
    }

    fn resolve<'a>(
        mapping: &'a SymbolMapping,
        pair: &CanonicalPair,
    ) -> Result<&'a str, SourceError> {
        mapping
            .get(pair.base())
            .ok_or_else(|| SourceError::UnmappedTicker(pair.base().to_string()))
    }

    fn request_url(base: &str, id: &str, pair: &CanonicalPair) -> Result<Url, SourceError> {
        http::request_url(base, QUOTES_LATEST_PATH, &[("id", id), ("convert", pair.quote())])
    }

    /// Reads `data.<id>.quote.<QUOTE>.price`.
    fn parse_price(body: &str, id: &str, pair: &CanonicalPair) -> Result<f64, SourceError> {
        let latest: QuotesLatest = http::decode(body)?;
        latest
            .data
            .get(id)
            .and_then(|asset| asset.quote.get(pair.quote()))
            .and_then(|quote| quote.price)
            .ok_or_else(|| {
                SourceError::MissingField(format!("data.{}.quote.{}.price", id, pair.quote()))
            })
    }
}

impl PriceSource for CoinMarketCap {
    fn name(&self) -> &str {
        "CoinMarketCap"
    }

    fn fetch_price(&self, pair: &CanonicalPair) -> Result<f64, SourceError> {
        let api_key = self.api_key.as_deref().ok_or(SourceError::MissingCredentials)?;
        let id = Self::resolve(&self.tables.coinmarketcap, pair)?;
        let url = Self::request_url(COINMARKETCAP_API, id, pair)?;
        let body = http::get_body(&self.client, url, &[(CMC_API_KEY_HEADER, api_key)])?;
        Self::parse_price(&body, id, pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "status": {"error_code": 0, "error_message": null},
        "data": {
            "1": {
                "id": 1,
                "symbol": "BTC",
                "quote": {"EUR": {"price": 27650.25, "last_updated": "2023-06-01T00:00:00.000Z"}}
            }
        }
    }"#;

    #[test]
    fn builds_request_from_mapped_id() {
        let mapping: SymbolMapping = [("BTC".to_string(), "1".to_string())].into_iter().collect();
        let pair: CanonicalPair = "btc/eur".parse().unwrap();
        let id = CoinMarketCap::resolve(&mapping, &pair).unwrap();
        let url = CoinMarketCap::request_url(COINMARKETCAP_API, id, &pair).unwrap();
        assert_eq!(
            url.as_str(),
            "https://pro-api.coinmarketcap.com/v2/cryptocurrency/quotes/latest?id=1&convert=EUR"
        );
    }

    #[test]
    fn reads_converted_price() {
        let pair: CanonicalPair = "BTC/EUR".parse().unwrap();
        assert_eq!(CoinMarketCap::parse_price(BODY, "1", &pair), Ok(27650.25));

        let other: CanonicalPair = "BTC/USD".parse().unwrap();
        assert!(matches!(
            CoinMarketCap::parse_price(BODY, "1", &other),
            Err(SourceError::MissingField(_))
        ));
    }

    #[test]
    fn missing_key_is_unavailable_without_a_request() {
        let source = CoinMarketCap::new(Client::new(), Arc::new(SymbolTables::default()), None);
        let pair: CanonicalPair = "BTC/USD".parse().unwrap();
        assert_eq!(source.fetch_price(&pair), Err(SourceError::MissingCredentials));
    }
}
