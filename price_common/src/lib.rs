//!
//! Common types and the consensus computation shared by the median calculator
//! and the mapping builder.
//!
//! This crate aggregates:
//! - `error` — `PriceError`, `SourceError` and `ConsensusError`.
//! - `result` — handy `Result<T, PriceError>` alias.
//! - `pair` — canonical `BASE/QUOTE` pairs and input parsing.
//! - `mapping` — per-source ticker → identifier tables and their builder.
//! - `quote` — a source's answer (price or absence) and per-pair quote sets.
//! - `consensus` — the outlier-filtered median reducer.
//! - `source` — the `PriceSource` trait implemented by every adapter.
//! - `aggregator` — runs all sources over a batch of pairs.
//! - `net` — endpoint constants and small helpers.
#![warn(missing_docs)]
pub mod aggregator;
pub mod consensus;
pub mod error;
pub mod mapping;
pub mod net;
pub mod pair;
pub mod quote;
pub mod result;
pub mod source;

pub use aggregator::{BatchReport, FetchMode, PairReport, PriceAggregator};
pub use consensus::{ConsensusResult, consensus_price};
pub use error::{ConsensusError, PriceError, SourceError};
pub use mapping::{CatalogRecord, SymbolMapping, SymbolTables, TieBreak};
pub use pair::CanonicalPair;
pub use quote::{Quote, QuoteSet};
pub use result::Result;
pub use source::PriceSource;
