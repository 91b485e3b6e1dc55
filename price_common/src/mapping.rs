//! Symbol mapping tables: per-source translation from ticker to source identifier.
//!
//! Every source names the same asset differently (CoinGecko uses slugs such as
//! `bitcoin`, CoinMarketCap numeric ids, Kraken prefixed asset codes such as
//! `XXBT`). A `SymbolMapping` is built once from a source's full catalog by the
//! offline builder and then loaded read-only by the median calculator.
//!
//! Collisions, i.e. several catalog entries listing the same ticker, are resolved
//! by a [`TieBreak`] policy so that every ticker maps to exactly one identifier.
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::PriceError;

/// One entry of a source catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Source-specific identifier (e.g. `bitcoin`, `1`, `XXBT`).
    pub id: String,
    /// Ticker the entry is listed under (e.g. `btc`, `BTC`, `XBT`).
    pub ticker: String,
    /// Popularity rank, smaller is better. `None` when unranked.
    pub rank: Option<u32>,
}

impl CatalogRecord {
    /// Creates an unranked record.
    pub fn new(id: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ticker: ticker.into(),
            rank: None,
        }
    }

    /// Creates a ranked record.
    pub fn ranked(id: impl Into<String>, ticker: impl Into<String>, rank: u32) -> Self {
        Self {
            id: id.into(),
            ticker: ticker.into(),
            rank: Some(rank),
        }
    }
}

/// How to pick one identifier when several catalog entries share a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    /// Fewest characters wins; the first listed wins among equal lengths.
    ShortestId,
    /// Numerically smallest rank wins; ranked beats unranked, first listed wins ties.
    BestRank,
    /// The first listed entry wins.
    FirstListed,
}

impl TieBreak {
    /// Whether `candidate` should replace `current`.
    fn prefers(self, candidate: &CatalogRecord, current: &CatalogRecord) -> bool {
        match self {
            TieBreak::ShortestId => candidate.id.chars().count() < current.id.chars().count(),
            TieBreak::BestRank => match (candidate.rank, current.rank) {
                (Some(c), Some(o)) => c < o,
                (Some(_), None) => true,
                _ => false,
            },
            TieBreak::FirstListed => false,
        }
    }
}

/// Immutable ticker → identifier table for one source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolMapping(BTreeMap<String, String>);

impl SymbolMapping {
    /// Builds a mapping from a catalog, choosing the policy from the data:
    /// [`TieBreak::BestRank`] when any record carries a rank, otherwise
    /// [`TieBreak::ShortestId`].
    pub fn from_catalog<I>(records: I) -> Self
    where
        I: IntoIterator<Item = CatalogRecord>,
    {
        let records: Vec<CatalogRecord> = records.into_iter().collect();
        let policy = if records.iter().any(|r| r.rank.is_some()) {
            TieBreak::BestRank
        } else {
            TieBreak::ShortestId
        };
        Self::build(records, policy)
    }

    /// Builds a mapping from a catalog with an explicit tie-break policy.
    pub fn build<I>(records: I, policy: TieBreak) -> Self
    where
        I: IntoIterator<Item = CatalogRecord>,
    {
        let mut chosen: BTreeMap<String, CatalogRecord> = BTreeMap::new();
        for record in records {
            match chosen.entry(record.ticker.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                Entry::Occupied(mut slot) => {
                    if policy.prefers(&record, slot.get()) {
                        slot.insert(record);
                    }
                }
            }
        }
        Self(
            chosen
                .into_iter()
                .map(|(ticker, record)| (ticker, record.id))
                .collect(),
        )
    }

    /// Merges a second catalog (e.g. fiat currencies) into this namespace.
    /// Entries from `other` replace existing entries with the same ticker.
    pub fn merge(mut self, other: SymbolMapping) -> Self {
        self.0.extend(other.0);
        self
    }

    /// Looks up the identifier for `ticker`.
    pub fn get(&self, ticker: &str) -> Option<&str> {
        self.0.get(ticker).map(String::as_str)
    }

    /// Number of mapped tickers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for SymbolMapping {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The three mapping tables consumed by the adapters, loaded once per process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolTables {
    /// Lower-case ticker → CoinGecko coin id.
    #[serde(default)]
    pub coingecko: SymbolMapping,
    /// Upper-case ticker → CoinMarketCap id (crypto and fiat).
    #[serde(default)]
    pub coinmarketcap: SymbolMapping,
    /// Kraken altname → Kraken asset code.
    #[serde(default)]
    pub kraken: SymbolMapping,
}

impl SymbolTables {
    /// Reads the JSON mapping artifact written by the mapping builder.
    pub fn load(path: &Path) -> Result<Self, PriceError> {
        let file = File::open(path)?;
        let tables: SymbolTables = serde_json::from_reader(BufReader::new(file))?;
        info!(
            "Loaded symbol tables from {}: coingecko={} coinmarketcap={} kraken={}",
            path.display(),
            tables.coingecko.len(),
            tables.coinmarketcap.len(),
            tables.kraken.len()
        );
        Ok(tables)
    }

    /// Writes the tables as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), PriceError> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}
