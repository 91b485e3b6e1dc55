//! The capability every price source implements.
use log::warn;

use crate::error::SourceError;
use crate::pair::CanonicalPair;
use crate::quote::Quote;

/// A price source that can quote canonical pairs.
///
/// Implementors only provide [`PriceSource::fetch_price`]; callers use
/// [`PriceSource::get_price`], which never fails and logs why a source was
/// unavailable.
pub trait PriceSource: Send + Sync {
    /// Display name used in diagnostics and reports.
    fn name(&self) -> &str;

    /// Queries the source for `pair`.
    fn fetch_price(&self, pair: &CanonicalPair) -> Result<f64, SourceError>;

    /// Queries the source and folds any failure into an absent quote.
    fn get_price(&self, pair: &CanonicalPair) -> Quote {
        let quote = Quote::from_fetch(self.fetch_price(pair));
        if let Quote::Unavailable(reason) = &quote {
            warn!("{} cannot get the price of {}: {}", self.name(), pair, reason);
        }
        quote
    }
}
