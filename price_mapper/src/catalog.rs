//! Catalog downloads and their conversion into symbol mappings.
//!
//! Each source publishes its full asset list:
//! - CoinGecko `/api/v3/coins/list` — `[{"id", "symbol", "name"}]`, unranked,
//!   so the shortest coin id wins a shared symbol.
//! - CoinMarketCap `/v1/cryptocurrency/map` (ranked) and `/v1/fiat/map`; fiat
//!   ids are merged into the crypto namespace and take precedence.
//! - Kraken `/0/public/Assets` — `{"result": {"XXBT": {"altname": "XBT"}}}`,
//!   mapped altname → asset code. Asset codes are visited in sorted order.
use std::collections::BTreeMap;
use std::time::Duration;

use log::{debug, info};
use price_common::net::{CMC_API_KEY_HEADER, COINGECKO_API, COINMARKETCAP_API, KRAKEN_API, endpoint};
use price_common::{CatalogRecord, PriceError, SymbolMapping, TieBreak};
use reqwest::blocking::Client;
use serde::Deserialize;

const COINGECKO_LIST_PATH: &str = "/api/v3/coins/list";
const CMC_CRYPTO_MAP_PATH: &str = "/v1/cryptocurrency/map";
const CMC_FIAT_MAP_PATH: &str = "/v1/fiat/map";
const KRAKEN_ASSETS_PATH: &str = "/public/Assets";

#[derive(Debug, Deserialize)]
struct CoinGeckoCoin {
    id: String,
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct CmcMap<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct CmcCrypto {
    id: u64,
    symbol: String,
    rank: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CmcFiat {
    id: u64,
    symbol: String,
}

#[derive(Debug, Deserialize)]
struct KrakenAssets {
    #[serde(default)]
    error: Vec<String>,
    #[serde(default)]
    result: BTreeMap<String, KrakenAsset>,
}

#[derive(Debug, Deserialize)]
struct KrakenAsset {
    altname: String,
}

/// Parses the CoinGecko coin list.
pub fn coingecko_records(body: &str) -> Result<Vec<CatalogRecord>, PriceError> {
    let coins: Vec<CoinGeckoCoin> = serde_json::from_str(body)?;
    Ok(coins
        .into_iter()
        .map(|coin| CatalogRecord::new(coin.id, coin.symbol))
        .collect())
}

/// Parses the CoinMarketCap cryptocurrency map.
pub fn cmc_crypto_records(body: &str) -> Result<Vec<CatalogRecord>, PriceError> {
    let map: CmcMap<CmcCrypto> = serde_json::from_str(body)?;
    Ok(map
        .data
        .into_iter()
        .map(|coin| CatalogRecord {
            id: coin.id.to_string(),
            ticker: coin.symbol,
            rank: coin.rank,
        })
        .collect())
}

/// Parses the CoinMarketCap fiat map.
pub fn cmc_fiat_records(body: &str) -> Result<Vec<CatalogRecord>, PriceError> {
    let map: CmcMap<CmcFiat> = serde_json::from_str(body)?;
    Ok(map
        .data
        .into_iter()
        .map(|fiat| CatalogRecord::new(fiat.id.to_string(), fiat.symbol))
        .collect())
}

/// Parses the Kraken asset list into altname → asset code records.
pub fn kraken_records(body: &str) -> Result<Vec<CatalogRecord>, PriceError> {
    let assets: KrakenAssets = serde_json::from_str(body)?;
    if !assets.error.is_empty() {
        return Err(PriceError::Mapping(format!(
            "Kraken rejected the asset request: {}",
            assets.error.join(", ")
        )));
    }
    Ok(assets
        .result
        .into_iter()
        .map(|(code, asset)| CatalogRecord::new(code, asset.altname))
        .collect())
}

/// CoinGecko: lower-case symbol → coin id, shortest id wins.
pub fn coingecko_mapping(records: Vec<CatalogRecord>) -> SymbolMapping {
    SymbolMapping::build(records, TieBreak::ShortestId)
}

/// CoinMarketCap: symbol → id, best rank wins, fiat merged on top.
pub fn coinmarketcap_mapping(
    crypto: Vec<CatalogRecord>,
    fiat: Vec<CatalogRecord>,
) -> SymbolMapping {
    SymbolMapping::build(crypto, TieBreak::BestRank)
        .merge(SymbolMapping::build(fiat, TieBreak::FirstListed))
}

/// Kraken: altname → asset code, first listed wins.
pub fn kraken_mapping(records: Vec<CatalogRecord>) -> SymbolMapping {
    SymbolMapping::build(records, TieBreak::FirstListed)
}

/// Downloads catalogs over HTTP.
pub struct CatalogClient {
    client: Client,
    cmc_api_key: Option<String>,
}

impl CatalogClient {
    pub fn new(timeout: Duration, cmc_api_key: Option<String>) -> Result<Self, PriceError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PriceError::Http(e.to_string()))?;
        Ok(Self { client, cmc_api_key })
    }

    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, PriceError> {
        debug!("GET {}", url);
        let mut request = self.client.get(url).header("Accept", "application/json");
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        request
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|e| PriceError::Http(format!("{url}: {e}")))
    }

    fn get_records<F>(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        parse: F,
    ) -> Result<Vec<CatalogRecord>, PriceError>
    where
        F: FnOnce(&str) -> Result<Vec<CatalogRecord>, PriceError>,
    {
        let records = parse(&self.get(url, headers)?)?;
        info!("Downloaded {} catalog entries from {}", records.len(), url);
        Ok(records)
    }

    /// Builds the CoinGecko table.
    pub fn coingecko(&self) -> Result<SymbolMapping, PriceError> {
        let url = endpoint(COINGECKO_API, COINGECKO_LIST_PATH);
        Ok(coingecko_mapping(self.get_records(&url, &[], coingecko_records)?))
    }

    /// Builds the CoinMarketCap table (crypto and fiat).
    pub fn coinmarketcap(&self) -> Result<SymbolMapping, PriceError> {
        let api_key = self
            .cmc_api_key
            .as_deref()
            .ok_or_else(|| PriceError::Mapping("missing CoinMarketCap API key".to_string()))?;
        let headers = [(CMC_API_KEY_HEADER, api_key)];
        let crypto = self.get_records(
            &endpoint(COINMARKETCAP_API, CMC_CRYPTO_MAP_PATH),
            &headers,
            cmc_crypto_records,
        )?;
        let fiat = self.get_records(
            &endpoint(COINMARKETCAP_API, CMC_FIAT_MAP_PATH),
            &headers,
            cmc_fiat_records,
        )?;
        Ok(coinmarketcap_mapping(crypto, fiat))
    }

    /// Builds the Kraken table.
    pub fn kraken(&self) -> Result<SymbolMapping, PriceError> {
        let url = endpoint(KRAKEN_API, KRAKEN_ASSETS_PATH);
        Ok(kraken_mapping(self.get_records(&url, &[], kraken_records)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coingecko_keeps_shortest_id_per_symbol() {
        let body = r#"[
            {"id": "bitcoin", "symbol": "btc", "name": "Bitcoin"},
            {"id": "bitcoin-on-some-bridge", "symbol": "btc", "name": "Bridged Bitcoin"},
            {"id": "ethereum", "symbol": "eth", "name": "Ethereum"}
        ]"#;
        let mapping = coingecko_mapping(coingecko_records(body).unwrap());
        assert_eq!(mapping.get("btc"), Some("bitcoin"));
        assert_eq!(mapping.get("eth"), Some("ethereum"));
    }

    #[test]
    fn coinmarketcap_prefers_rank_and_merges_fiat() {
        let crypto = r#"{"status": {}, "data": [
            {"id": 31000, "symbol": "BTC", "rank": 2500},
            {"id": 1, "symbol": "BTC", "rank": 1},
            {"id": 4000, "symbol": "USD", "rank": 900},
            {"id": 77, "symbol": "NEW", "rank": null}
        ]}"#;
        let fiat = r#"{"data": [
            {"id": 2781, "name": "United States Dollar", "sign": "$", "symbol": "USD"}
        ]}"#;
        let mapping = coinmarketcap_mapping(
            cmc_crypto_records(crypto).unwrap(),
            cmc_fiat_records(fiat).unwrap(),
        );
        assert_eq!(mapping.get("BTC"), Some("1"));
        assert_eq!(mapping.get("USD"), Some("2781"));
        assert_eq!(mapping.get("NEW"), Some("77"));
    }

    #[test]
    fn kraken_maps_altname_to_asset_code() {
        let body = r#"{"error": [], "result": {
            "XXBT": {"aclass": "currency", "altname": "XBT", "decimals": 10},
            "ZUSD": {"aclass": "currency", "altname": "USD", "decimals": 4}
        }}"#;
        let mapping = kraken_mapping(kraken_records(body).unwrap());
        assert_eq!(mapping.get("XBT"), Some("XXBT"));
        assert_eq!(mapping.get("USD"), Some("ZUSD"));
    }

    #[test]
    fn kraken_error_is_reported() {
        let body = r#"{"error": ["EGeneral:Temporary lockout"]}"#;
        assert!(matches!(kraken_records(body), Err(PriceError::Mapping(_))));
    }
}
