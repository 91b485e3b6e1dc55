//! Quotes reported by price sources.
//!
//! A `Quote` is either a finite positive price or an explicit absence carrying
//! the reason. Absence is an ordinary value: adapters fold every failure into
//! `Quote::Unavailable` instead of returning an error to the orchestrator.
use std::fmt;

use serde::Serialize;

use crate::error::SourceError;

/// One source's answer for a pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Quote {
    /// A finite, strictly positive price.
    Available(f64),
    /// The source could not answer; holds the reason.
    Unavailable(SourceError),
}

impl Quote {
    /// Converts a raw adapter result into a quote, rejecting non-finite or
    /// non-positive values.
    pub fn from_fetch(result: Result<f64, SourceError>) -> Self {
        match result {
            Ok(price) if price.is_finite() && price > 0.0 => Quote::Available(price),
            Ok(price) => Quote::Unavailable(SourceError::InvalidPrice(price.to_string())),
            Err(e) => Quote::Unavailable(e),
        }
    }

    /// The price, if the source answered.
    pub fn price(&self) -> Option<f64> {
        match self {
            Quote::Available(price) => Some(*price),
            Quote::Unavailable(_) => None,
        }
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quote::Available(price) => write!(f, "{price}"),
            Quote::Unavailable(reason) => write!(f, "unavailable ({reason})"),
        }
    }
}

/// A quote tagged with the name of the source that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceQuote {
    /// Display name of the source, e.g. `Binance`.
    pub source: String,
    /// What the source answered.
    pub quote: Quote,
}

/// All quotes gathered for one pair, in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QuoteSet {
    quotes: Vec<SourceQuote>,
}

impl QuoteSet {
    /// Appends one source's answer.
    pub fn push(&mut self, source: impl Into<String>, quote: Quote) {
        self.quotes.push(SourceQuote {
            source: source.into(),
            quote,
        });
    }

    /// Every answer, available or not.
    pub fn iter(&self) -> impl Iterator<Item = &SourceQuote> {
        self.quotes.iter()
    }

    /// Available prices only, ready for the reducer.
    pub fn prices(&self) -> Vec<f64> {
        self.quotes.iter().filter_map(|q| q.quote.price()).collect()
    }

    /// Names of the sources that answered with a price.
    pub fn answered(&self) -> Vec<&str> {
        self.quotes
            .iter()
            .filter(|q| q.quote.price().is_some())
            .map(|q| q.source.as_str())
            .collect()
    }

    /// Number of sources queried.
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Returns `true` if no source was queried.
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_and_non_finite_prices() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                Quote::from_fetch(Ok(bad)),
                Quote::Unavailable(SourceError::InvalidPrice(_))
            ));
        }
        assert_eq!(Quote::from_fetch(Ok(1.5)), Quote::Available(1.5));
    }

    #[test]
    fn quote_set_filters_absences() {
        let mut set = QuoteSet::default();
        set.push("A", Quote::Available(10.0));
        set.push("B", Quote::from_fetch(Err(SourceError::UnmappedTicker("ZZZ".into()))));
        set.push("C", Quote::Available(11.0));

        assert_eq!(set.len(), 3);
        assert_eq!(set.prices(), vec![10.0, 11.0]);
        assert_eq!(set.answered(), vec!["A", "C"]);
    }

    #[test]
    fn unavailable_quote_serializes_reason() {
        let quote = Quote::Unavailable(SourceError::MissingCredentials);
        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["status"], "unavailable");
        assert_eq!(json["value"], "missing API credentials");
    }
}
