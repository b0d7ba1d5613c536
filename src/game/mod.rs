//! Game site integration.
//!
//! Defines the `GameSite` trait (the authenticated transport the poll loop
//! talks through) and the endpoint layout of the Airline Manager web client.
//! The real implementation is `session::Session`.

pub mod session;

use async_trait::async_trait;
use reqwest::Url;

use crate::types::{BotError, NotificationMessage, NotifyOutcome};

pub use session::Session;

/// Authenticated access to the game's pages and alliance chat.
///
/// Neither method returns an error: failures are logged by the
/// implementation and surface as `None` / `NotifyOutcome::Failed`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameSite: Send + Sync {
    /// GET a page; `Some(body)` only on HTTP 200.
    async fn fetch_page(&self, url: &str, label: &str) -> Option<String>;

    /// Post a stamped message to the alliance chat.
    async fn send_chat(&self, message: &NotificationMessage) -> NotifyOutcome;
}

/// Absolute URLs of every endpoint the bot touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub base: Url,
    pub login: Url,
    pub fuel: Url,
    pub co2: Url,
    pub chat: Url,
}

impl Endpoints {
    /// Lay out the endpoints under `base_url` (scheme and host, optionally a path prefix).
    pub fn from_base(base_url: &str) -> Result<Self, BotError> {
        let mut base = Url::parse(base_url)
            .map_err(|e| BotError::Config(format!("invalid site.base_url {base_url:?}: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let join = |rel: &str| {
            base.join(rel)
                .map_err(|e| BotError::Config(format!("cannot build {rel} URL: {e}")))
        };

        Ok(Self {
            login: join("weblogin/login.php")?,
            fuel: join("fuel.php")?,
            co2: join("co2.php")?,
            chat: join("alliance_chat.php?mode=do")?,
            base,
        })
    }

    /// `Origin` header value: scheme, host and port without a trailing slash.
    pub fn origin(&self) -> String {
        self.base.origin().ascii_serialization()
    }

    /// `Referer` header value the in-browser client sends.
    pub fn referer(&self) -> String {
        format!("{}?gameType=web", self.base)
    }
}
