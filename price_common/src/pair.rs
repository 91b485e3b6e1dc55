//! Canonical currency pairs and helpers for reading them from user input.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use log::warn;

use crate::error::PriceError;

/// Separator between base and quote in the canonical text form.
pub const SEPARATOR: char = '/';

/// A base/quote ticker combination, independent of any source's naming.
///
/// Both tickers are non-empty, upper-case and made of ASCII letters and digits
/// only, so they never contain the separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalPair {
    base: String,
    quote: String,
}

impl CanonicalPair {
    /// Creates a pair from two tickers, trimming and upper-casing both.
    pub fn new(base: &str, quote: &str) -> Result<Self, PriceError> {
        let base = base.trim().to_ascii_uppercase();
        let quote = quote.trim().to_ascii_uppercase();
        let valid = |t: &str| !t.is_empty() && t.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid(&base) || !valid(&quote) {
            return Err(PriceError::InvalidPair(format!("{base}{SEPARATOR}{quote}")));
        }
        Ok(Self { base, quote })
    }

    /// Base asset ticker, e.g. `BTC`.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Quote asset ticker, e.g. `USD`.
    pub fn quote(&self) -> &str {
        &self.quote
    }
}

impl fmt::Display for CanonicalPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.base, SEPARATOR, self.quote)
    }
}

impl FromStr for CanonicalPair {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once(SEPARATOR) {
            Some((base, quote)) => {
                Self::new(base, quote).map_err(|_| PriceError::InvalidPair(s.to_string()))
            }
            None => Err(PriceError::InvalidPair(s.to_string())),
        }
    }
}

impl TryFrom<String> for CanonicalPair {
    type Error = PriceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CanonicalPair> for String {
    fn from(pair: CanonicalPair) -> Self {
        pair.to_string()
    }
}

/// Trait providing file parsing for pairs.
pub trait PairParser {
    /// Parses pairs from a buffered reader.
    ///
    /// Pairs may be separated by commas, spaces or new lines. Returns an error
    /// on the first token that is not a valid `BASE/QUOTE` pair.
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<CanonicalPair>, PriceError>;
}

impl PairParser for CanonicalPair {
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<Self>, PriceError> {
        let mut pairs = Vec::new();

        for line_result in reader.lines() {
            let line = line_result.map_err(PriceError::Io)?;
            for token in tokens(&line) {
                pairs.push(token.parse::<Self>()?);
            }
        }
        Ok(pairs)
    }
}

/// Parses a free-form list such as `BTC/USD eth/usdt Xrp/Usd`.
///
/// Invalid tokens are logged and skipped so one typo does not discard the rest.
pub fn parse_pairs(input: &str) -> Vec<CanonicalPair> {
    tokens(input)
        .filter_map(|token| match token.parse::<CanonicalPair>() {
            Ok(pair) => Some(pair),
            Err(e) => {
                warn!("Skipping input: {}", e);
                None
            }
        })
        .collect()
}

fn tokens(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_and_uppercases() {
        let pair: CanonicalPair = "eth/usdt".parse().unwrap();
        assert_eq!(pair.base(), "ETH");
        assert_eq!(pair.quote(), "USDT");
        assert_eq!(pair.to_string(), "ETH/USDT");
    }

    #[test]
    fn rejects_malformed_tokens() {
        for bad in ["BTC", "/USD", "BTC/", "BTC/USD/EUR", ""] {
            assert!(bad.parse::<CanonicalPair>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn direct_construction_rejects_non_alphanumeric_tickers() {
        for (base, quote) in [("B TC", "USD"), ("BTC", "US-D"), ("BTC", "USD/EUR"), ("", "USD")] {
            assert!(
                CanonicalPair::new(base, quote).is_err(),
                "{base:?}/{quote:?} should be rejected"
            );
        }
        let pair = CanonicalPair::new(" 1inch ", "usdt").unwrap();
        assert_eq!(pair.to_string(), "1INCH/USDT");
    }

    #[test]
    fn free_form_list_skips_invalid_tokens() {
        let pairs = parse_pairs("BTC/USD  eth/usdt, nonsense Xrp/Usd");
        let text: Vec<String> = pairs.iter().map(ToString::to_string).collect();
        assert_eq!(text, ["BTC/USD", "ETH/USDT", "XRP/USD"]);
    }

    #[test]
    fn file_parser_is_strict() {
        let input = Cursor::new("BTC/USD\n\neth/usd, sol/usdt\n");
        let ok = CanonicalPair::parse_from_file(input).unwrap();
        assert_eq!(ok.len(), 3);

        let err = CanonicalPair::parse_from_file(Cursor::new("BTC/USD\nBTCUSD\n"));
        assert!(matches!(err, Err(PriceError::InvalidPair(token)) if token == "BTCUSD"));
    }

    #[test]
    fn serializes_as_text() {
        let pair = CanonicalPair::new("btc", "usd").unwrap();
        assert_eq!(serde_json::to_string(&pair).unwrap(), "\"BTC/USD\"");
        let back: CanonicalPair = serde_json::from_str("\"btc/usd\"").unwrap();
        assert_eq!(back, pair);
    }
}
