//! Error types shared by the median calculator and the mapping builder.
//!
//! Three enums cover the three layers of the system:
//! - `PriceError` unifies process-level failures (I/O, JSON, bad input, HTTP),
//!   so binaries can propagate a single error type out of `main`.
//! - `SourceError` describes why one price source could not answer for a pair.
//!   It never escapes an adapter; it is folded into an absent `Quote`.
//! - `ConsensusError` is the per-pair "no consensus" outcome of the reducer.
use std::io;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Unified error type shared by both binaries.
#[derive(Error, Debug)]
pub enum PriceError {
    /// I/O error originating from the standard library (files, stdin).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// A `BASE/QUOTE` token could not be parsed into a canonical pair.
    #[error("Invalid pair `{0}`: expected BASE/QUOTE")]
    InvalidPair(String),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// HTTP transport failure outside of a price adapter (e.g. catalog download).
    #[error("HTTP error: {0}")]
    Http(String),

    /// A catalog or mapping artifact did not contain what was expected.
    #[error("Symbol mapping error: {0}")]
    Mapping(String),
}

/// Reason a single source could not produce a price for a pair.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    /// Request could not be sent, timed out, or returned a non-success status.
    #[error("request failed: {0}")]
    Http(String),

    /// The mapping table has no identifier for this ticker.
    #[error("no identifier for ticker {0}")]
    UnmappedTicker(String),

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The response decoded but the expected field is absent.
    #[error("missing field in response: {0}")]
    MissingField(String),

    /// The source answered with an explicit error payload.
    #[error("source rejected the request: {0}")]
    Rejected(String),

    /// The reported value is not a finite positive number.
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    /// The source needs credentials that were not configured.
    #[error("missing API credentials")]
    MissingCredentials,

    /// The adapter panicked while answering.
    #[error("adapter panicked: {0}")]
    Panicked(String),
}

/// Serialized as its display message.
impl Serialize for SourceError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of the reducer when no consensus price can be produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsensusError {
    /// Fewer than the minimum number of quotes were collected.
    #[error("the prices are retrieved from less than {min} sources (found {found})")]
    InsufficientSources {
        /// Number of available quotes.
        found: usize,
        /// Minimum number required.
        min: usize,
    },

    /// Outlier rejection left fewer than the minimum number of quotes.
    #[error(
        "some price sources deviate more than 50 percent, leaving {} of the required {min} sources",
        .kept.len()
    )]
    ExcessiveDivergence {
        /// Prices that survived the acceptance band.
        kept: Vec<f64>,
        /// Prices rejected as outliers.
        rejected: Vec<f64>,
        /// Minimum number required.
        min: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_error_serializes_as_message() {
        let json = serde_json::to_string(&SourceError::UnmappedTicker("XYZ".into())).unwrap();
        assert_eq!(json, r#""no identifier for ticker XYZ""#);
        let json = serde_json::to_string(&SourceError::MissingCredentials).unwrap();
        assert_eq!(json, r#""missing API credentials""#);
    }
}
