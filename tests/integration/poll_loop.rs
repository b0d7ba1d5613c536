//! Full cycles: real session, pattern extractor and notifier against the
//! fake site, with a recording clock in place of real sleeps.

use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal_macros::dec;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fuel_bot::clock::Clock;
use fuel_bot::market::PatternExtractor;
use fuel_bot::notifier::Notifier;
use fuel_bot::poller::{MarketPages, Poller, Schedule};
use fuel_bot::types::{MarketKind, NotifyOutcome, Thresholds};

use crate::fake_site::{self, FakeSite};
use crate::session::login;

#[derive(Clone, Default)]
struct RecordingClock {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

#[async_trait]
impl Clock for RecordingClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 7, 45, 30).unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

async fn poller(site: &Arc<FakeSite>, dry_run: bool) -> (Poller, RecordingClock) {
    let base = site.spawn().await;
    let session = login(&base, fake_site::EMAIL, fake_site::PASSWORD).await.unwrap();
    let pages = MarketPages {
        fuel: session.endpoints().fuel.to_string(),
        co2: session.endpoints().co2.to_string(),
    };
    let clock = RecordingClock::default();
    let poller = Poller::new(
        Box::new(session),
        Box::new(PatternExtractor),
        Box::new(clock.clone()),
        Notifier::new("fuel-bot", dry_run),
        pages,
        Thresholds {
            fuel: dec!(500),
            co2: dec!(120),
        },
        Schedule::default(),
    );
    (poller, clock)
}

#[tokio::test]
async fn test_cheap_fuel_posts_alert() {
    let site = FakeSite::new();
    site.set_fuel(StatusCode::OK, fake_site::fuel_body(1_700_000_000, "480,470,460"));
    site.set_co2(StatusCode::OK, fake_site::co2_body("150,130,125"));
    let (mut poller, clock) = poller(&site, false).await;

    let report = poller.tick().await;

    assert_eq!(report.alerts, vec![(MarketKind::Fuel, NotifyOutcome::Sent)]);
    let posts = site.chat_posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(
        posts[0].form["alMsg"],
        "[ fuel-bot ] Fuel price is below 500. Last price: 460. - @ 2024-06-15 07:45:30 UTC"
    );
    assert_eq!(*clock.sleeps.lock().unwrap(), vec![Duration::from_secs(1_700_000_005)]);
}

#[tokio::test]
async fn test_both_markets_cheap_posts_two_alerts() {
    let site = FakeSite::new();
    site.set_fuel(StatusCode::OK, fake_site::fuel_body(900, "520,499"));
    site.set_co2(StatusCode::OK, fake_site::co2_body("121,119.5"));
    let (mut poller, _clock) = poller(&site, false).await;

    let report = poller.run_cycle().await;
    assert_eq!(report.alerts.len(), 2);

    let texts: Vec<String> = site.chat_posts().iter().map(|p| p.form["alMsg"].clone()).collect();
    assert!(texts[0].starts_with("[ fuel-bot ] Fuel price is below 500. Last price: 499."));
    assert!(texts[1].starts_with("[ fuel-bot ] CO2 price is below 120. Last price: 119.5."));
}

#[tokio::test]
async fn test_fuel_outage_skips_fuel_and_sleeps_fallback() {
    let site = FakeSite::new();
    site.set_fuel(StatusCode::SERVICE_UNAVAILABLE, "down for maintenance");
    site.set_co2(StatusCode::OK, fake_site::co2_body("150,130,125"));
    let (mut poller, clock) = poller(&site, false).await;

    let report = poller.tick().await;

    assert!(report.fuel.is_none());
    assert_eq!(report.co2.unwrap().last_price(), Some("125"));
    assert!(site.chat_posts().is_empty());
    assert_eq!(*clock.sleeps.lock().unwrap(), vec![Duration::from_secs(60)]);
}

#[tokio::test]
async fn test_dry_run_posts_nothing() {
    let site = FakeSite::new();
    site.set_fuel(StatusCode::OK, fake_site::fuel_body(60, "300"));
    site.set_co2(StatusCode::OK, fake_site::co2_body("90"));
    let (mut poller, _clock) = poller(&site, true).await;

    let report = poller.run_cycle().await;
    assert_eq!(report.alerts.len(), 2);
    assert!(site.chat_posts().is_empty());
}

#[tokio::test]
async fn test_loop_survives_session_expiry() {
    let site = FakeSite::new();
    site.set_fuel(StatusCode::OK, fake_site::fuel_body(30, "600"));
    site.set_co2(StatusCode::OK, fake_site::co2_body("200"));
    let (mut poller, clock) = poller(&site, false).await;

    assert!(poller.tick().await.fuel.is_some());
    site.expire_sessions();
    let report = poller.tick().await;
    assert!(report.fuel.is_none());
    assert!(report.co2.is_none());

    assert_eq!(
        *clock.sleeps.lock().unwrap(),
        vec![Duration::from_secs(35), Duration::from_secs(60)]
    );
}
