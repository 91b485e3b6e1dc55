//! Shared endpoint constants and helpers used by the median calculator and the
//! mapping builder.

/// Binance REST API.
pub const BINANCE_API: &str = "https://api.binance.com";
/// CoinGecko public API.
pub const COINGECKO_API: &str = "https://api.coingecko.com";
/// CoinMarketCap professional API.
pub const COINMARKETCAP_API: &str = "https://pro-api.coinmarketcap.com";
/// Kraken public REST API.
pub const KRAKEN_API: &str = "https://api.kraken.com/0";
/// OKX REST API.
pub const OKX_API: &str = "https://www.okx.com";

/// Header carrying the CoinMarketCap API key.
pub const CMC_API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";
/// Environment variable holding the CoinMarketCap API key.
pub const CMC_API_KEY_ENV: &str = "CMC_API_KEY";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Default location of the mapping artifact.
pub const DEFAULT_SYMBOLS_PATH: &str = "static_symbols.json";

/// Helper to join a base URL and a path like "base/path".
pub fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_without_doubled_slashes() {
        assert_eq!(
            endpoint(KRAKEN_API, "/public/Ticker"),
            "https://api.kraken.com/0/public/Ticker"
        );
        assert_eq!(endpoint("http://host/", "a"), "http://host/a");
    }
}
