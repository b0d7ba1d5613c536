//! Authenticated session against the Airline Manager web client.
//!
//! Login is a form POST to `weblogin/login.php`; the server answers with a
//! `PHPSESSID` cookie that every later request carries through the shared
//! cookie jar. The session is never refreshed: if the server expires it,
//! page fetches start failing (usually a redirect to the login page) and
//! that shows up in the logs.

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, ORIGIN, REFERER};
use reqwest::{Client, Response, StatusCode};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::{Endpoints, GameSite};
use crate::config::{Credentials, HttpConfig, SiteConfig};
use crate::types::{BotError, NotificationMessage, NotifyOutcome};

/// Sentinel the login form submits when not signing in through Facebook.
const LOGIN_FB_SIG: &str = "null";
/// Sentinel the chat form submits.
const CHAT_FB_SIG: &str = "false";
/// Content type the in-browser client sends with both forms.
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// One logged-in browser session: HTTP client plus its cookie jar.
pub struct Session {
    http: Client,
    jar: Arc<Jar>,
    endpoints: Endpoints,
    accept_language: String,
}

impl Session {
    /// Build the client without logging in.
    fn unauthenticated(endpoints: Endpoints, site: &SiteConfig, http: &HttpConfig) -> Result<Self, BotError> {
        let jar = Arc::new(Jar::default());
        let mut builder = Client::builder()
            .cookie_provider(jar.clone())
            .user_agent(site.user_agent.as_str());
        if let Some(timeout) = http.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            jar,
            endpoints,
            accept_language: site.accept_language.clone(),
        })
    }

    /// Log in and return the live session.
    ///
    /// Fails unless the server answers 200 *and* sets `site.session_cookie`.
    /// Status and body of a rejected login are logged before returning.
    pub async fn authenticate(
        endpoints: Endpoints,
        site: &SiteConfig,
        http: &HttpConfig,
        credentials: &Credentials,
    ) -> Result<Self, BotError> {
        let session = Self::unauthenticated(endpoints, site, http)?;
        info!(url = %session.endpoints.login, "Logging in...");

        let resp = session
            .http
            .post(session.endpoints.login.clone())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .form(&[
                ("lEmail", credentials.email.as_str()),
                ("lPass", credentials.password.expose_secret().as_str()),
                ("fbSig", LOGIN_FB_SIG),
            ])
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Login request failed");
                BotError::Http(e)
            })?;

        let status = resp.status();
        let body = read_body(resp, "login").await;

        if status != StatusCode::OK {
            error!("Login failed!");
            error!(status = status.as_u16(), "Response status code");
            error!(body = %body, "Response content");
            return Err(BotError::Auth {
                status: status.as_u16(),
                body,
            });
        }

        if !session.has_cookie(&site.session_cookie) {
            error!("Login failed!");
            error!(status = status.as_u16(), cookie = %site.session_cookie, "Session cookie missing");
            error!(body = %body, "Response content");
            return Err(BotError::MissingSessionCookie {
                cookie: site.session_cookie.clone(),
            });
        }

        info!("Login successful!");
        Ok(session)
    }

    /// Whether the jar holds a cookie named `name` for the site root.
    pub fn has_cookie(&self, name: &str) -> bool {
        let Some(header) = self.jar.cookies(&self.endpoints.base) else {
            return false;
        };
        let Ok(header) = header.to_str() else {
            return false;
        };
        header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .any(|(key, _)| key == name)
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }
}

/// Body text for diagnostics; a read failure is logged and yields "".
async fn read_body(resp: Response, what: &str) -> String {
    match resp.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!(error = ?e, "Failed to read {what} response body");
            String::new()
        }
    }
}

#[async_trait]
impl GameSite for Session {
    async fn fetch_page(&self, url: &str, label: &str) -> Option<String> {
        debug!(url, "Fetching {label} page");

        let resp = match self.http.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                error!(error = ?e, "Error fetching {label} page: {e}");
                return None;
            }
        };

        let status = resp.status();
        if status != StatusCode::OK {
            error!("Failed to fetch {label} page!");
            error!(status = status.as_u16(), "Status Code");
            error!(url = %resp.url(), "Redirect URL");
            return None;
        }

        match resp.text().await {
            Ok(body) => {
                info!("Successfully fetched {label} page!");
                Some(body)
            }
            Err(e) => {
                error!(error = ?e, "Error reading {label} page body: {e}");
                None
            }
        }
    }

    async fn send_chat(&self, message: &NotificationMessage) -> NotifyOutcome {
        let text = message.text();

        let resp = self
            .http
            .post(self.endpoints.chat.clone())
            .header(ACCEPT, "*/*")
            .header(ACCEPT_LANGUAGE, self.accept_language.as_str())
            .header(ORIGIN, self.endpoints.origin())
            .header(REFERER, self.endpoints.referer())
            .header("X-Requested-With", "XMLHttpRequest")
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .form(&[("alMsg", text.as_str()), ("fbSig", CHAT_FB_SIG)])
            .send()
            .await;

        let resp = match resp {
            Ok(resp) => resp,
            Err(e) => {
                error!(error = ?e, "Failed to send message: {e}");
                return NotifyOutcome::Failed;
            }
        };

        let status = resp.status();
        if status == StatusCode::OK {
            info!("Message sent successfully!");
            NotifyOutcome::Sent
        } else {
            let body = read_body(resp, "chat").await;
            error!("Failed to send message.");
            error!(status = status.as_u16(), "Status Code");
            error!(body = %body, "Response content");
            NotifyOutcome::Failed
        }
    }
}
