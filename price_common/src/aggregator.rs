//! Pair orchestration: query every source, reduce, collect the batch report.
//!
//! Failures are isolated at two levels:
//! - a source that errors, or even panics, becomes an absent quote for that
//!   source only, and the remaining sources still contribute;
//! - a pair without consensus is recorded with its reason and the batch moves
//!   on to the next pair.
//!
//! Sources of one pair may be queried one after another or on scoped threads
//! (see [`FetchMode`]). Quotes are always reported in source order and the
//! reducer is order independent, so both modes produce the same report.
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::unbounded;
use log::{debug, error, info, warn};

use crate::consensus::{ConsensusResult, consensus_price};
use crate::error::{ConsensusError, SourceError};
use crate::pair::CanonicalPair;
use crate::quote::{Quote, QuoteSet};
use crate::source::PriceSource;

/// How the sources of a single pair are queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// One source after another.
    #[default]
    Sequential,
    /// All sources at once on scoped threads.
    Parallel,
}

/// Everything computed for one pair.
#[derive(Debug, Clone)]
pub struct PairReport {
    /// The pair that was priced.
    pub pair: CanonicalPair,
    /// Each source's answer, in source order.
    pub quotes: QuoteSet,
    /// Consensus price or the reason there is none.
    pub consensus: ConsensusResult,
}

/// Reports for a batch of pairs, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// One report per processed pair.
    pub reports: Vec<PairReport>,
    /// Set when the batch stopped before the last pair.
    pub interrupted: bool,
}

impl BatchReport {
    /// Pairs that reached consensus with their price, in input order.
    pub fn summary(&self) -> Vec<(&CanonicalPair, f64)> {
        self.reports
            .iter()
            .filter_map(|r| r.consensus.as_ref().ok().map(|price| (&r.pair, *price)))
            .collect()
    }

    /// Pairs without consensus with the reason, in input order.
    pub fn failures(&self) -> Vec<(&CanonicalPair, &ConsensusError)> {
        self.reports
            .iter()
            .filter_map(|r| r.consensus.as_ref().err().map(|e| (&r.pair, e)))
            .collect()
    }
}

/// Queries a fixed set of sources for each pair and reduces their quotes.
pub struct PriceAggregator {
    sources: Vec<Box<dyn PriceSource>>,
    mode: FetchMode,
}

impl PriceAggregator {
    /// Creates an aggregator querying `sources` sequentially.
    pub fn new(sources: Vec<Box<dyn PriceSource>>) -> Self {
        Self {
            sources,
            mode: FetchMode::default(),
        }
    }

    /// Selects how the sources of one pair are queried.
    pub fn with_mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Names of the configured sources, in query order.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Asks every source for `pair`.
    pub fn collect_quotes(&self, pair: &CanonicalPair) -> QuoteSet {
        let answers: Vec<Quote> = match self.mode {
            FetchMode::Sequential => self
                .sources
                .iter()
                .map(|source| query(source.as_ref(), pair))
                .collect(),
            FetchMode::Parallel => self.query_parallel(pair),
        };

        let mut quotes = QuoteSet::default();
        for (source, quote) in self.sources.iter().zip(answers) {
            debug!("{} {}: {}", source.name(), pair, quote);
            quotes.push(source.name(), quote);
        }
        quotes
    }

    /// Collects quotes for `pair` and reduces them.
    pub fn evaluate(&self, pair: &CanonicalPair) -> PairReport {
        let quotes = self.collect_quotes(pair);
        let consensus = consensus_price(&quotes.prices());
        match &consensus {
            Ok(price) => info!("Median of pair {} equals to {:.8}", pair, price),
            Err(e) => warn!("No consensus for {}: {}", pair, e),
        }
        PairReport {
            pair: pair.clone(),
            quotes,
            consensus,
        }
    }

    /// Evaluates every pair in order.
    pub fn run(&self, pairs: &[CanonicalPair], shutdown: &AtomicBool) -> BatchReport {
        self.run_with(pairs, shutdown, |_, _| {})
    }

    /// Evaluates every pair in order, handing each report to `on_report` as
    /// soon as it is ready.
    ///
    /// `shutdown` is checked between pairs; once set, the remaining pairs are
    /// skipped and the reports gathered so far are returned.
    pub fn run_with<F>(
        &self,
        pairs: &[CanonicalPair],
        shutdown: &AtomicBool,
        mut on_report: F,
    ) -> BatchReport
    where
        F: FnMut(usize, &PairReport),
    {
        let mut batch = BatchReport::default();
        for (index, pair) in pairs.iter().enumerate() {
            if shutdown.load(Ordering::Relaxed) {
                warn!("Shutdown requested, skipping {} remaining pair(s)", pairs.len() - index);
                batch.interrupted = true;
                break;
            }
            info!("Pair {}: {}", index + 1, pair);
            let report = self.evaluate(pair);
            on_report(index, &report);
            batch.reports.push(report);
        }
        batch
    }

    fn query_parallel(&self, pair: &CanonicalPair) -> Vec<Quote> {
        let (tx, rx) = unbounded::<(usize, Quote)>();
        thread::scope(|scope| {
            for (index, source) in self.sources.iter().enumerate() {
                let tx = tx.clone();
                scope.spawn(move || {
                    if let Err(e) = tx.send((index, query(source.as_ref(), pair))) {
                        error!("Failed to collect quote from {}: {}", source.name(), e);
                    }
                });
            }
        });
        drop(tx);

        let mut answers: Vec<Option<Quote>> = vec![None; self.sources.len()];
        for (index, quote) in rx.iter() {
            answers[index] = Some(quote);
        }
        answers
            .into_iter()
            .map(|answer| {
                answer.unwrap_or_else(|| {
                    Quote::Unavailable(SourceError::Panicked("no answer collected".to_string()))
                })
            })
            .collect()
    }
}

/// Asks one source, turning a panic inside the adapter into an absent quote.
fn query(source: &dyn PriceSource, pair: &CanonicalPair) -> Quote {
    match panic::catch_unwind(AssertUnwindSafe(|| source.get_price(pair))) {
        Ok(quote) => quote,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!("{} panicked while pricing {}: {}", source.name(), pair, message);
            Quote::Unavailable(SourceError::Panicked(message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
