//! Pattern extraction for the fuel and CO2 market pages.
//!
//! Both pages render their chart from an inline script call whose first
//! argument is the price history, e.g. `fuel_startFuelChart([480,470,460], ...)`.
//! The fuel page also starts a jQuery countdown to the next market refresh:
//! `$('#fuelTimer').countdown({until: 1234, ...})`.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

use super::MarketExtractor;
use crate::types::{Co2Snapshot, FuelSnapshot};

macro_rules! re {
    ($pat:expr) => {
        LazyLock::new(|| Regex::new($pat).unwrap())
    };
}

static RE_FUEL_TIMER: LazyLock<Regex> = re!(r"fuelTimer'\)\.countdown\(\{\s*until:\s*(\d+),");
static RE_FUEL_CHART: LazyLock<Regex> = re!(r"fuel_startFuelChart\(\[(.*?)\],");
static RE_CO2_CHART: LazyLock<Regex> = re!(r"co2_startCo2Chart\(\[(.*?)\],");

/// Regex-backed extractor for the live site markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternExtractor;

impl MarketExtractor for PatternExtractor {
    fn extract_fuel(&self, body: &str) -> Option<FuelSnapshot> {
        extract_fuel(body)
    }

    fn extract_co2(&self, body: &str) -> Option<Co2Snapshot> {
        extract_co2(body)
    }
}

fn extract_u64(re: &Regex, body: &str) -> Option<u64> {
    re.captures(body)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn extract_list(re: &Regex, body: &str) -> Option<Vec<String>> {
    re.captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().split(',').map(str::to_string).collect())
}

/// Countdown and price history from the fuel page. Both must be present.
pub fn extract_fuel(body: &str) -> Option<FuelSnapshot> {
    match (extract_u64(&RE_FUEL_TIMER, body), extract_list(&RE_FUEL_CHART, body)) {
        (Some(countdown_secs), Some(prices)) => {
            debug!(countdown_secs, samples = prices.len(), "Parsed fuel market");
            Some(FuelSnapshot {
                countdown_secs,
                prices,
            })
        }
        (timer, prices) => {
            warn!(
                timer_found = timer.is_some(),
                chart_found = prices.is_some(),
                "Could not find fuel market data."
            );
            None
        }
    }
}

/// Price history from the CO2 page.
pub fn extract_co2(body: &str) -> Option<Co2Snapshot> {
    match extract_list(&RE_CO2_CHART, body) {
        Some(prices) => {
            debug!(samples = prices.len(), "Parsed CO2 market");
            Some(Co2Snapshot { prices })
        }
        None => {
            warn!("Could not find CO2 market data.");
            None
        }
    }
}
