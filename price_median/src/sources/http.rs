//! Blocking HTTP helpers shared by the price adapters.
use std::time::Duration;

use log::debug;
use price_common::{PriceError, SourceError};
use reqwest::Url;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

/// Longest slice of an error body kept in diagnostics.
const MAX_ERROR_BODY: usize = 200;

/// Builds the single HTTP client shared by every adapter.
pub fn build_client(timeout: Duration) -> Result<Client, PriceError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| PriceError::Http(e.to_string()))
}

/// Builds `base` + `path` with URL-encoded query parameters.
pub fn request_url(base: &str, path: &str, params: &[(&str, &str)]) -> Result<Url, SourceError> {
    Url::parse_with_params(&price_common::net::endpoint(base, path), params)
        .map_err(|e| SourceError::Http(format!("invalid URL: {e}")))
}

/// Sends a GET request and returns the body of a successful response.
///
/// A non-success status becomes [`SourceError::Rejected`] carrying the start of
/// the body, which is where exchanges put their error message.
pub fn get_body(
    client: &Client,
    url: Url,
    headers: &[(&str, &str)],
) -> Result<String, SourceError> {
    debug!("GET {}", url);
    let mut request = client.get(url).header("Accept", "application/json");
    for (name, value) in headers {
        request = request.header(*name, *value);
    }

    let response = request.send().map_err(|e| SourceError::Http(e.to_string()))?;
    let status = response.status();
    let body = response.text().map_err(|e| SourceError::Http(e.to_string()))?;
    if !status.is_success() {
        let excerpt: String = body.chars().take(MAX_ERROR_BODY).collect();
        return Err(SourceError::Rejected(format!("HTTP {status}: {excerpt}")));
    }
    Ok(body)
}

/// Decodes a JSON body into `T`.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, SourceError> {
    serde_json::from_str(body).map_err(|e| SourceError::Malformed(e.to_string()))
}

/// Parses a price sent as a decimal string, e.g. `"30000.01000000"`.
pub fn parse_decimal(text: &str) -> Result<f64, SourceError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| SourceError::InvalidPrice(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_parameters_are_encoded() {
        let params = [("ids", "usd-coin"), ("q", "a b")];
        let url = request_url("https://example.com/", "/simple", &params).unwrap();
        assert_eq!(url.as_str(), "https://example.com/simple?ids=usd-coin&q=a+b");
    }

    #[test]
    fn decimal_strings() {
        assert_eq!(parse_decimal(" 30000.01000000 "), Ok(30000.01));
        assert!(matches!(parse_decimal("n/a"), Err(SourceError::InvalidPrice(_))));
    }

    #[test]
    fn malformed_json_is_reported() {
        let decoded: Result<Vec<u32>, _> = decode("{not json");
        assert!(matches!(decoded, Err(SourceError::Malformed(_))));
    }
}
