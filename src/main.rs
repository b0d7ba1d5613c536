//! fuel-bot: Airline Manager market watcher.
//!
//! Entry point. Loads configuration and credentials, initialises console
//! and file logging, logs in once, then polls the fuel and CO2 markets
//! forever, posting to alliance chat when a price drops below threshold.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::{error, info};

use fuel_bot::clock::SystemClock;
use fuel_bot::config::{self, AppConfig};
use fuel_bot::game::{Endpoints, Session};
use fuel_bot::market::PatternExtractor;
use fuel_bot::notifier::Notifier;
use fuel_bot::poller::{MarketPages, Poller, Schedule};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path = AppConfig::default_path();
    let loaded = AppConfig::load_optional(&config_path);

    // A broken config still gets logged, to the default log file.
    let cfg = match &loaded {
        Ok(Some(cfg)) => cfg.clone(),
        _ => AppConfig::default(),
    };
    init_logging(&cfg.logging)?;

    match loaded {
        Ok(Some(_)) => info!(path = %config_path, "Loaded config file"),
        Ok(None) => info!(path = %config_path, "No config file found, using defaults"),
        Err(e) => {
            error!(error = format!("{e:#}"), "Failed to load config, exiting");
            return Err(e);
        }
    }

    info!(
        config = %config_path,
        tag = %cfg.bot.tag,
        base_url = %cfg.site.base_url,
        fuel_threshold = %cfg.thresholds.fuel,
        co2_threshold = %cfg.thresholds.co2,
        dry_run = cfg.bot.dry_run,
        "fuel-bot starting up"
    );

    let credentials = cfg.credentials.resolve()?;
    let endpoints = Endpoints::from_base(&cfg.site.base_url)?;

    // Fatal: nothing works without a session, and there is no retry.
    let session = match Session::authenticate(endpoints, &cfg.site, &cfg.http, &credentials).await {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, "Authentication failed, exiting");
            return Err(e.into());
        }
    };

    let pages = MarketPages {
        fuel: session.endpoints().fuel.to_string(),
        co2: session.endpoints().co2.to_string(),
    };

    let mut poller = Poller::new(
        Box::new(session),
        Box::new(PatternExtractor),
        Box::new(SystemClock),
        Notifier::new(cfg.bot.tag.clone(), cfg.bot.dry_run),
        pages,
        cfg.thresholds,
        Schedule::from_config(&cfg.bot),
    );

    poller.run().await;
    Ok(())
}

/// Initialise the `tracing` subscriber: console plus append-mode log file.
fn init_logging(cfg: &config::LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("fuel_bot=info"));

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cfg.file)
        .with_context(|| format!("Failed to open log file: {}", cfg.file))?;
    let file = Mutex::new(file);

    let json_logging = std::env::var("FUEL_BOT_LOG_JSON").is_ok();

    if json_logging {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_target(true))
            .with(fmt::layer().json().with_target(true).with_writer(file))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true))
            .with(fmt::layer().with_target(true).with_ansi(false).with_writer(file))
            .init();
    }

    Ok(())
}
