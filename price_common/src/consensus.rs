//! Outlier-filtered median over the quotes of one pair.
//!
//! The reducer takes one pass: the acceptance band is derived from the median
//! of the full input and applied to every price at once, then the median of the
//! survivors is the consensus price. The band is never re-derived after
//! removal.
use crate::error::ConsensusError;

/// Minimum number of prices required before and after outlier removal.
pub const MIN_SOURCES: usize = 3;
/// Half-width of the acceptance band as a fraction of the median.
pub const MAX_DEVIATION: f64 = 0.5;
/// Fractional digits kept in the consensus price.
pub const PRICE_DECIMALS: i32 = 8;

/// Result of reducing one pair's quotes.
pub type ConsensusResult = Result<f64, ConsensusError>;

/// Reduces `prices` into a single consensus price.
///
/// `prices` must be finite and positive; absent quotes are filtered out by the
/// caller. The order of `prices` does not affect the result.
pub fn consensus_price(prices: &[f64]) -> ConsensusResult {
    if prices.len() < MIN_SOURCES {
        return Err(ConsensusError::InsufficientSources {
            found: prices.len(),
            min: MIN_SOURCES,
        });
    }

    let (floor, ceiling) = acceptance_band(median(prices));
    let (kept, rejected): (Vec<f64>, Vec<f64>) = prices
        .iter()
        .partition(|&&price| !(price > ceiling || price < floor));

    if kept.len() < MIN_SOURCES {
        return Err(ConsensusError::ExcessiveDivergence {
            kept,
            rejected,
            min: MIN_SOURCES,
        });
    }

    Ok(round_price(median(&kept)))
}

/// Inclusive `[floor, ceiling]` around `median`.
pub fn acceptance_band(median: f64) -> (f64, f64) {
    let deviation = MAX_DEVIATION * median;
    (median - deviation, median + deviation)
}

/// Median of a non-empty slice; the mean of the two middle values for even lengths.
pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Rounds to [`PRICE_DECIMALS`] fractional digits.
pub fn round_price(price: f64) -> f64 {
    let scale = 10f64.powi(PRICE_DECIMALS);
    (price * scale).round() / scale
}
