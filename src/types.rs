//! Shared types for the fuel bot.
//!
//! Market snapshots, thresholds, chat messages and the domain error type.
//! Everything here is an in-memory value produced and dropped within a
//! single poll cycle; nothing is persisted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Timestamp layout appended to every chat message.
pub const MESSAGE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

// ---------------------------------------------------------------------------
// Markets
// ---------------------------------------------------------------------------

/// Which in-game market a snapshot or alert refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketKind {
    Fuel,
    Co2,
}

impl MarketKind {
    /// Label used in fetch logs ("Successfully fetched fuel market page").
    pub fn page_label(&self) -> &'static str {
        match self {
            MarketKind::Fuel => "fuel market",
            MarketKind::Co2 => "CO2 market",
        }
    }
}

impl fmt::Display for MarketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketKind::Fuel => write!(f, "Fuel"),
            MarketKind::Co2 => write!(f, "CO2"),
        }
    }
}

/// Fuel market state scraped from `fuel.php`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuelSnapshot {
    /// Value of the page's `countdown({until: N})` initialiser, taken as-is.
    pub countdown_secs: u64,
    /// Chart samples in page order; the last one is the current price.
    pub prices: Vec<String>,
}

impl FuelSnapshot {
    pub fn last_price(&self) -> Option<&str> {
        self.prices.last().map(String::as_str)
    }
}

/// CO2 market state scraped from `co2.php`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Co2Snapshot {
    /// Chart samples in page order; the last one is the current price.
    pub prices: Vec<String>,
}

impl Co2Snapshot {
    pub fn last_price(&self) -> Option<&str> {
        self.prices.last().map(String::as_str)
    }
}

/// Parse a scraped price sample. Surrounding whitespace is ignored.
pub fn parse_price(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim()).ok()
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Alert thresholds; a market alerts when its current price is strictly below.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub fuel: Decimal,
    pub co2: Decimal,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            fuel: dec!(500),
            co2: dec!(120),
        }
    }
}

impl Thresholds {
    pub fn for_market(&self, kind: MarketKind) -> Decimal {
        match kind {
            MarketKind::Fuel => self.fuel,
            MarketKind::Co2 => self.co2,
        }
    }
}

// ---------------------------------------------------------------------------
// Chat messages
// ---------------------------------------------------------------------------

/// A chat payload: the alert text plus the UTC moment it was stamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

impl NotificationMessage {
    pub fn new(body: impl Into<String>, sent_at: DateTime<Utc>) -> Self {
        Self {
            body: body.into(),
            sent_at,
        }
    }

    /// The text actually posted: `<body> - @ <YYYY-MM-DD HH:MM:SS UTC>`.
    pub fn text(&self) -> String {
        format!("{} - @ {}", self.body, self.sent_at.format(MESSAGE_TIME_FORMAT))
    }
}

impl fmt::Display for NotificationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Result of a chat send. Failures are logged by the sender and never escalate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    Failed,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for the bot.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("Login failed with HTTP {status}")]
    Auth { status: u16, body: String },

    #[error("Login returned HTTP 200 but no {cookie} cookie was set")]
    MissingSessionCookie { cookie: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
