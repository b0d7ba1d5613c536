//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` (or the file named by `FUEL_BOT_CONFIG`) and
//! deserializes into strongly-typed structs. Every field has a default, so
//! a missing file runs the bot against the live site with stock thresholds.
//! Credentials are referenced by env-var name and resolved at runtime.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::types::Thresholds;

/// Env var that overrides the config file path.
pub const CONFIG_PATH_ENV: &str = "FUEL_BOT_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub bot: BotConfig,
    pub thresholds: Thresholds,
    pub site: SiteConfig,
    pub http: HttpConfig,
    pub credentials: CredentialsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BotConfig {
    /// Name shown in brackets at the start of every alert.
    pub tag: String,
    /// Sleep used when no fuel countdown was obtained this cycle.
    pub fallback_sleep_secs: u64,
    /// Added to the fuel countdown so the next poll lands after the refresh.
    pub countdown_buffer_secs: u64,
    /// Log alerts instead of posting them to chat.
    pub dry_run: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            tag: "fuel-bot".to_string(),
            fallback_sleep_secs: 60,
            countdown_buffer_secs: 5,
            dry_run: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    /// Cookie whose presence after login proves the session is live.
    pub session_cookie: String,
    pub user_agent: String,
    pub accept_language: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.airlinemanager.com".to_string(),
            session_cookie: "PHPSESSID".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "en-US,en;q=0.9,ro;q=0.8".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout. Unset means the transport never gives up on its own.
    pub timeout_secs: Option<u64>,
}

impl HttpConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CredentialsConfig {
    pub email_env: String,
    pub password_env: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            email_env: "EMAIL".to_string(),
            password_env: "PASSWORD".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file, appended to alongside console output.
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: "fuel_bot.log".to_string(),
        }
    }
}

/// Login identity resolved from the environment.
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::new(password.into()),
        }
    }
}

impl CredentialsConfig {
    /// Read the email and password from the configured env vars.
    pub fn resolve(&self) -> Result<Credentials> {
        let email = AppConfig::resolve_env(&self.email_env)?;
        let password = AppConfig::resolve_env(&self.password_env)?;
        Ok(Credentials::new(email, password))
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Load from `path` when it exists; `None` means the caller runs on defaults.
    pub fn load_optional(path: &str) -> Result<Option<Self>> {
        if !Path::new(path).exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Config path from `FUEL_BOT_CONFIG`, or `config.toml`.
    pub fn default_path() -> String {
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
