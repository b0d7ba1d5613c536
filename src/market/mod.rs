//! Market page parsing and threshold decisions.
//!
//! Defines the `MarketExtractor` trait so the brittle page matching can be
//! swapped out in tests, plus the strict below-threshold check shared by
//! both markets.

pub mod extract;

use rust_decimal::Decimal;
use tracing::warn;

use crate::types::{parse_price, Co2Snapshot, FuelSnapshot, MarketKind};

pub use extract::PatternExtractor;

/// Turns a raw market page body into a snapshot, or `None` when the
/// expected script snippets are missing.
pub trait MarketExtractor: Send + Sync {
    fn extract_fuel(&self, body: &str) -> Option<FuelSnapshot>;

    fn extract_co2(&self, body: &str) -> Option<Co2Snapshot>;
}

/// Whether `last_price` is strictly below `threshold`.
///
/// Returns `None` (after a warning) when the sample is not a number, in
/// which case no alert decision is made for this cycle.
pub fn is_below_threshold(kind: MarketKind, last_price: &str, threshold: Decimal) -> Option<bool> {
    match parse_price(last_price) {
        Some(price) => Some(price < threshold),
        None => {
            warn!(market = %kind, raw = last_price, "Last price is not numeric, skipping threshold check");
            None
        }
    }
}
