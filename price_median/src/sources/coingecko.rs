//! CoinGecko simple price. The base ticker is translated to a CoinGecko coin id;
//! the quote currency is passed as a lower-case ticker.
use std::collections::HashMap;
use std::sync::Arc;

use price_common::net::COINGECKO_API;
use price_common::{CanonicalPair, PriceSource, SourceError, SymbolMapping, SymbolTables};
use reqwest::Url;
use reqwest::blocking::Client;

use super::http;

const SIMPLE_PRICE_PATH: &str = "/api/v3/simple/price";

/// Coin id and vs-currency for one request.
#[derive(Debug, PartialEq)]
struct Request {
    id: String,
    vs_currency: String,
}

/// Price adapter for CoinGecko.
pub struct CoinGecko {
    client: Client,
    tables: Arc<SymbolTables>,
}

impl CoinGecko {
    pub fn new(client: Client, tables: Arc<SymbolTables>) -> Self {
        Self { client, tables }
    }

    fn resolve(mapping: &SymbolMapping, pair: &CanonicalPair) -> Result<Request, SourceError> {
        let base = pair.base().to_ascii_lowercase();
        let id = mapping
            .get(&base)
            .ok_or_else(|| SourceError::UnmappedTicker(base.clone()))?;
        Ok(Request {
            id: id.to_string(),
            vs_currency: pair.quote().to_ascii_lowercase(),
        })
    }

    fn request_url(base: &str, request: &Request) -> Result<Url, SourceError> {
        http::request_url(
            base,
            SIMPLE_PRICE_PATH,
            &[
                ("ids", request.id.as_str()),
                ("vs_currencies", request.vs_currency.as_str()),
            ],
        )
    }

    /// Body looks like `{"bitcoin": {"usd": 30000.0}}`.
    fn parse_price(body: &str, request: &Request) -> Result<f64, SourceError> {
        let prices: HashMap<String, HashMap<String, f64>> = http::decode(body)?;
        prices
            .get(&request.id)
            .and_then(|currencies| currencies.get(&request.vs_currency))
            .copied()
            .ok_or_else(|| {
                SourceError::MissingField(format!("{}.{}", request.id, request.vs_currency))
            })
    }
}

impl PriceSource for CoinGecko {
    fn name(&self) -> &str {
        "CoinGecko"
    }

    fn fetch_price(&self, pair: &CanonicalPair) -> Result<f64, SourceError> {
        let request = Self::resolve(&self.tables.coingecko, pair)?;
        let url = Self::request_url(COINGECKO_API, &request)?;
        let body = http::get_body(&self.client, url, &[])?;
        Self::parse_price(&body, &request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> SymbolMapping {
        [("btc".to_string(), "bitcoin".to_string())].into_iter().collect()
    }

    #[test]
    fn translates_base_and_lowercases_quote() {
        let pair: CanonicalPair = "BTC/USD".parse().unwrap();
        let request = CoinGecko::resolve(&mapping(), &pair).unwrap();
        assert_eq!(
            request,
            Request {
                id: "bitcoin".to_string(),
                vs_currency: "usd".to_string()
            }
        );
        let url = CoinGecko::request_url(COINGECKO_API, &request).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=usd"
        );
    }

    #[test]
    fn unmapped_base_is_unavailable() {
        let pair: CanonicalPair = "NOPE/USD".parse().unwrap();
        assert_eq!(
            CoinGecko::resolve(&mapping(), &pair),
            Err(SourceError::UnmappedTicker("nope".to_string()))
        );
    }

    #[test]
    fn reads_price_keyed_by_translated_id() {
        let request = Request {
            id: "bitcoin".to_string(),
            vs_currency: "usd".to_string(),
        };
        assert_eq!(CoinGecko::parse_price(r#"{"bitcoin":{"usd":30001.5}}"#, &request), Ok(30001.5));
        assert!(matches!(
            CoinGecko::parse_price("{}", &request),
            Err(SourceError::MissingField(field)) if field == "bitcoin.usd"
        ));
    }
}
