//! Poll loop: fetch → extract → compare → notify, then sleep.
//!
//! One cycle checks the fuel market, then the CO2 market, then sleeps
//! until just after the fuel market's own refresh (or a fixed fallback when
//! the fuel page gave no countdown). Every step is fail-soft: fetch and
//! parse problems skip that market for the cycle, chat failures are logged.

use std::time::Duration;
use tracing::info;

use crate::clock::Clock;
use crate::config::BotConfig;
use crate::game::GameSite;
use crate::market::{is_below_threshold, MarketExtractor};
use crate::notifier::Notifier;
use crate::types::{Co2Snapshot, FuelSnapshot, MarketKind, NotifyOutcome, Thresholds};

/// Sleep policy between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub countdown_buffer: Duration,
    pub fallback: Duration,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            countdown_buffer: Duration::from_secs(5),
            fallback: Duration::from_secs(60),
        }
    }
}

impl Schedule {
    pub fn from_config(cfg: &BotConfig) -> Self {
        Self {
            countdown_buffer: Duration::from_secs(cfg.countdown_buffer_secs),
            fallback: Duration::from_secs(cfg.fallback_sleep_secs),
        }
    }

    /// `countdown + buffer` when fuel data was obtained, otherwise the fallback.
    pub fn next_sleep(&self, fuel: Option<&FuelSnapshot>) -> Duration {
        match fuel {
            Some(snap) => Duration::from_secs(snap.countdown_secs).saturating_add(self.countdown_buffer),
            None => self.fallback,
        }
    }
}

/// Page URLs polled each cycle.
#[derive(Debug, Clone)]
pub struct MarketPages {
    pub fuel: String,
    pub co2: String,
}

/// What one cycle saw and did.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub cycle_number: u64,
    pub fuel: Option<FuelSnapshot>,
    pub co2: Option<Co2Snapshot>,
    pub alerts: Vec<(MarketKind, NotifyOutcome)>,
    pub sleep: Duration,
}

pub struct Poller {
    site: Box<dyn GameSite>,
    extractor: Box<dyn MarketExtractor>,
    clock: Box<dyn Clock>,
    notifier: Notifier,
    pages: MarketPages,
    thresholds: Thresholds,
    schedule: Schedule,
    cycle_count: u64,
}

impl Poller {
    pub fn new(
        site: Box<dyn GameSite>,
        extractor: Box<dyn MarketExtractor>,
        clock: Box<dyn Clock>,
        notifier: Notifier,
        pages: MarketPages,
        thresholds: Thresholds,
        schedule: Schedule,
    ) -> Self {
        Self {
            site,
            extractor,
            clock,
            notifier,
            pages,
            thresholds,
            schedule,
            cycle_count: 0,
        }
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// Poll forever. Only process termination stops this.
    pub async fn run(&mut self) {
        info!(
            fuel_threshold = %self.thresholds.fuel,
            co2_threshold = %self.thresholds.co2,
            "Entering poll loop"
        );
        loop {
            self.tick().await;
        }
    }

    /// One cycle followed by its sleep.
    pub async fn tick(&mut self) -> CycleReport {
        let report = self.run_cycle().await;
        info!("Sleeping for {} seconds until the next refresh...", report.sleep.as_secs());
        self.clock.sleep(report.sleep).await;
        report
    }

    /// Check both markets once and work out the next sleep. Never sleeps itself.
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.cycle_count += 1;
        let mut alerts = Vec::new();

        let fuel = self.poll_fuel().await;
        if let Some(snap) = &fuel {
            info!("Fuel Timer (seconds): {}", snap.countdown_secs);
            info!("Fuel Prices: {:?}", snap.prices);
            if let Some(outcome) = self.check(MarketKind::Fuel, snap.last_price()).await {
                alerts.push((MarketKind::Fuel, outcome));
            }
        }

        let co2 = self.poll_co2().await;
        if let Some(snap) = &co2 {
            info!("CO2 Prices: {:?}", snap.prices);
            if let Some(outcome) = self.check(MarketKind::Co2, snap.last_price()).await {
                alerts.push((MarketKind::Co2, outcome));
            }
        }

        let sleep = self.schedule.next_sleep(fuel.as_ref());

        CycleReport {
            cycle_number: self.cycle_count,
            fuel,
            co2,
            alerts,
            sleep,
        }
    }

    async fn poll_fuel(&self) -> Option<FuelSnapshot> {
        let body = self
            .site
            .fetch_page(&self.pages.fuel, MarketKind::Fuel.page_label())
            .await?;
        self.extractor.extract_fuel(&body)
    }

    async fn poll_co2(&self) -> Option<Co2Snapshot> {
        let body = self
            .site
            .fetch_page(&self.pages.co2, MarketKind::Co2.page_label())
            .await?;
        self.extractor.extract_co2(&body)
    }

    /// Log the current price and alert when it is below the threshold.
    /// Returns the send outcome when an alert went out.
    async fn check(&self, kind: MarketKind, last_price: Option<&str>) -> Option<NotifyOutcome> {
        let last = last_price?;
        info!("Last {kind} Price: {last}");

        let threshold = self.thresholds.for_market(kind);
        if !is_below_threshold(kind, last, threshold)? {
            return None;
        }

        let text = self.notifier.alert_text(kind, threshold, last);
        Some(self.notifier.notify(&*self.site, &*self.clock, &text).await)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
