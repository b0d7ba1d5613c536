//! Alliance chat notifier.
//!
//! Stamps alert text with the current UTC time and posts it through the
//! game session. Sending is best-effort: a failed post is logged by the
//! session and the caller carries on. In dry-run mode nothing is posted.

use tracing::info;

use crate::clock::Clock;
use crate::game::GameSite;
use crate::types::{MarketKind, NotificationMessage, NotifyOutcome};

pub struct Notifier {
    tag: String,
    dry_run: bool,
}

impl Notifier {
    pub fn new(tag: impl Into<String>, dry_run: bool) -> Self {
        Self {
            tag: tag.into(),
            dry_run,
        }
    }

    /// `[ <tag> ] Fuel price is below 500. Last price: 460.`
    pub fn alert_text(&self, kind: MarketKind, threshold: impl std::fmt::Display, last_price: &str) -> String {
        format!(
            "[ {} ] {kind} price is below {threshold}. Last price: {last_price}.",
            self.tag
        )
    }

    /// Stamp `text` with `clock.now()` and post it.
    pub async fn notify(&self, site: &dyn GameSite, clock: &dyn Clock, text: &str) -> NotifyOutcome {
        let message = NotificationMessage::new(text, clock.now());

        if self.dry_run {
            info!(message = %message, "Dry run: alert not posted");
            return NotifyOutcome::Sent;
        }

        site.send_chat(&message).await
    }
}
