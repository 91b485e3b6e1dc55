//! Text and JSON presentation of batch results.
use chrono::Utc;
use price_common::consensus::PRICE_DECIMALS;
use price_common::{BatchReport, CanonicalPair, PairReport, PriceError};
use serde::Serialize;

/// Width of banners and separators.
const WIDTH: usize = 75;

fn rule() -> String {
    "=".repeat(WIDTH)
}

/// Prints the start-up banner describing the expected input.
pub fn print_banner() {
    println!("{}", rule());
    println!("{}", rule());
    for line in [
        " This application will calculate the median price of symbols pairs ",
        " It will receive a list of symbol pairs ",
        " For example: BTC/USD eth/usdt Xrp/Usd ",
        " Then returns the median price of each symbols pair ",
    ] {
        println!("{line:^WIDTH$}");
    }
    println!("{}", rule());
    println!("{}", rule());
    println!();
}

/// Echoes the pairs that will be priced.
pub fn print_pairs(pairs: &[CanonicalPair]) {
    let list: Vec<String> = pairs.iter().map(ToString::to_string).collect();
    println!();
    println!("Symbol pairs retrieved: {}", list.join(" "));
    println!("{}", rule());
}

/// Prints what every source answered and the consensus for one pair.
pub fn print_pair_report(index: usize, report: &PairReport) {
    println!("{}", rule());
    println!("Pair {}: {}", index + 1, report.pair);
    for answer in report.quotes.iter() {
        println!("{}: {}", answer.source, answer.quote);
    }
    println!("{}", rule());
    match &report.consensus {
        Ok(price) => println!(
            "Median of pair: {} equals to {:.*}",
            report.pair, PRICE_DECIMALS as usize, price
        ),
        Err(e) => println!("No median for pair {}: {}", report.pair, e),
    }
    println!("{}", rule());
}

/// Prints the sparse summary of pairs that reached consensus.
pub fn print_summary(batch: &BatchReport) {
    let summary = batch.summary();
    if summary.is_empty() {
        println!("\nCan not get median price of any symbols pair\n");
    } else {
        let entries: Vec<String> = summary
            .iter()
            .map(|(pair, price)| format!("{}: {:.*}", pair, PRICE_DECIMALS as usize, price))
            .collect();
        println!("\nMedian Prices: {{{}}}", entries.join(", "));
        println!();
    }
    if batch.interrupted {
        println!("Interrupted: remaining pairs were not priced.");
    }
    println!("{}", rule());
}

#[derive(Debug, Serialize)]
struct JsonSummary<'a> {
    computed_at: String,
    median_prices: Vec<JsonPrice<'a>>,
    failures: Vec<JsonFailure<'a>>,
    interrupted: bool,
}

#[derive(Debug, Serialize)]
struct JsonPrice<'a> {
    pair: &'a CanonicalPair,
    price: f64,
    sources: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct JsonFailure<'a> {
    pair: &'a CanonicalPair,
    reason: String,
}

/// Renders the batch as a JSON document.
pub fn summary_json(batch: &BatchReport) -> Result<String, PriceError> {
    let mut median_prices = Vec::new();
    let mut failures = Vec::new();
    for report in &batch.reports {
        match &report.consensus {
            Ok(price) => median_prices.push(JsonPrice {
                pair: &report.pair,
                price: *price,
                sources: report.quotes.answered(),
            }),
            Err(e) => failures.push(JsonFailure {
                pair: &report.pair,
                reason: e.to_string(),
            }),
        }
    }
    let summary = JsonSummary {
        computed_at: Utc::now().to_rfc3339(),
        median_prices,
        failures,
        interrupted: batch.interrupted,
    };
    Ok(serde_json::to_string_pretty(&summary)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use price_common::{ConsensusError, Quote, QuoteSet};

    fn report(pair: &str, prices: &[f64], consensus: Result<f64, ConsensusError>) -> PairReport {
        let mut quotes = QuoteSet::default();
        for (i, price) in prices.iter().enumerate() {
            quotes.push(format!("S{i}"), Quote::Available(*price));
        }
        PairReport {
            pair: pair.parse().unwrap(),
            quotes,
            consensus,
        }
    }

    #[test]
    fn json_lists_prices_and_failures_separately() {
        let batch = BatchReport {
            reports: vec![
                report("BTC/USD", &[1.0, 1.0, 1.0], Ok(1.0)),
                report(
                    "ETH/USD",
                    &[2.0],
                    Err(ConsensusError::InsufficientSources { found: 1, min: 3 }),
                ),
            ],
            interrupted: false,
        };

        let json: serde_json::Value = serde_json::from_str(&summary_json(&batch).unwrap()).unwrap();
        assert_eq!(json["median_prices"][0]["pair"], "BTC/USD");
        assert_eq!(json["median_prices"][0]["price"], 1.0);
        assert_eq!(json["median_prices"][0]["sources"].as_array().unwrap().len(), 3);
        assert_eq!(json["failures"][0]["pair"], "ETH/USD");
        assert!(json["failures"][0]["reason"].as_str().unwrap().contains("less than 3"));
        assert_eq!(json["interrupted"], false);
    }
}
