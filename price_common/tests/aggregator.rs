use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use price_common::{
    CanonicalPair, ConsensusError, FetchMode, PriceAggregator, PriceSource, Quote, SourceError,
};

/// In-memory source answering from a fixed table.
struct FixedSource {
    name: String,
    prices: HashMap<String, f64>,
}

impl FixedSource {
    fn boxed(name: &str, prices: &[(&str, f64)]) -> Box<dyn PriceSource> {
        Box::new(Self {
            name: name.to_string(),
            prices: prices.iter().map(|(p, v)| (p.to_string(), *v)).collect(),
        })
    }
}

impl PriceSource for FixedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_price(&self, pair: &CanonicalPair) -> Result<f64, SourceError> {
        self.prices
            .get(&pair.to_string())
            .copied()
            .ok_or_else(|| SourceError::Rejected(format!("unknown pair {pair}")))
    }
}

struct PanickingSource;

impl PriceSource for PanickingSource {
    fn name(&self) -> &str {
        "Broken"
    }

    fn fetch_price(&self, _pair: &CanonicalPair) -> Result<f64, SourceError> {
        panic!("response shape changed")
    }
}

fn pairs(text: &[&str]) -> Vec<CanonicalPair> {
    text.iter().map(|p| p.parse().unwrap()).collect()
}

fn four_sources() -> Vec<Box<dyn PriceSource>> {
    vec![
        FixedSource::boxed("A", &[("BTC/USD", 30000.0), ("ETH/USD", 2000.0)]),
        FixedSource::boxed("B", &[("BTC/USD", 30100.0), ("ETH/USD", 2010.0)]),
        FixedSource::boxed("C", &[("BTC/USD", 29950.0)]),
        FixedSource::boxed("D", &[("BTC/USD", 30050.0), ("ETH/USD", 9000.0)]),
    ]
}

#[test]
fn end_to_end_consensus_for_one_pair() {
    let aggregator = PriceAggregator::new(four_sources());
    let batch = aggregator.run(&pairs(&["BTC/USD"]), &AtomicBool::new(false));

    assert_eq!(batch.reports.len(), 1);
    let report = &batch.reports[0];
    assert_eq!(report.quotes.answered(), vec!["A", "B", "C", "D"]);
    assert_eq!(report.consensus, Ok(30025.0));
    assert_eq!(format!("{:.8}", batch.summary()[0].1), "30025.00000000");
}

#[test]
fn failed_pairs_are_reported_but_left_out_of_summary() {
    let aggregator = PriceAggregator::new(four_sources());
    let batch = aggregator.run(
        &pairs(&["ETH/USD", "BTC/USD", "DOGE/USD"]),
        &AtomicBool::new(false),
    );

    assert_eq!(batch.reports.len(), 3);
    // ETH: 2000, 2010, 9000 -> 9000 rejected, two left
    let failures = batch.failures();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].0.to_string(), "ETH/USD");
    assert!(matches!(failures[0].1, ConsensusError::ExcessiveDivergence { .. }));
    assert_eq!(failures[1].0.to_string(), "DOGE/USD");
    assert_eq!(
        failures[1].1,
        &ConsensusError::InsufficientSources { found: 0, min: 3 }
    );

    let summary = batch.summary();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].0.to_string(), "BTC/USD");
}

#[test]
fn panicking_source_does_not_affect_the_others() {
    let mut sources = four_sources();
    sources.insert(1, Box::new(PanickingSource));
    let aggregator = PriceAggregator::new(sources);

    let batch = aggregator.run(&pairs(&["BTC/USD", "BTC/USD"]), &AtomicBool::new(false));

    for report in &batch.reports {
        assert_eq!(report.consensus, Ok(30025.0));
        let broken = report.quotes.iter().find(|q| q.source == "Broken").unwrap();
        assert_eq!(
            broken.quote,
            Quote::Unavailable(SourceError::Panicked("response shape changed".to_string()))
        );
    }
}

#[test]
fn parallel_fetch_matches_sequential() {
    let input = pairs(&["BTC/USD", "ETH/USD"]);
    let mut with_panic = four_sources();
    with_panic.push(Box::new(PanickingSource));
    let sequential = PriceAggregator::new(with_panic).run(&input, &AtomicBool::new(false));

    let mut with_panic = four_sources();
    with_panic.push(Box::new(PanickingSource));
    let parallel = PriceAggregator::new(with_panic)
        .with_mode(FetchMode::Parallel)
        .run(&input, &AtomicBool::new(false));

    for (s, p) in sequential.reports.iter().zip(&parallel.reports) {
        assert_eq!(s.quotes, p.quotes);
        assert_eq!(s.consensus, p.consensus);
    }
}

#[test]
fn source_order_does_not_change_the_result() {
    let mut reversed = four_sources();
    reversed.reverse();
    let forward = PriceAggregator::new(four_sources()).evaluate(&"BTC/USD".parse().unwrap());
    let backward = PriceAggregator::new(reversed).evaluate(&"BTC/USD".parse().unwrap());
    assert_eq!(forward.consensus, backward.consensus);
}

#[test]
fn shutdown_keeps_finished_pairs() {
    let shutdown = AtomicBool::new(false);
    let aggregator = PriceAggregator::new(four_sources());
    let input = pairs(&["BTC/USD", "ETH/USD", "SOL/USD"]);

    let mut seen = Vec::new();
    let batch = aggregator.run_with(&input, &shutdown, |index, report| {
        seen.push((index, report.pair.to_string()));
        shutdown.store(true, Ordering::SeqCst);
    });

    assert!(batch.interrupted);
    assert_eq!(seen, vec![(0, "BTC/USD".to_string())]);
    assert_eq!(batch.summary().len(), 1);
    assert_eq!(batch.summary()[0].1, 30025.0);
}
