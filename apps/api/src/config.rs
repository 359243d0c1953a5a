use std::time::Duration;

use anyhow::{ensure, Context, Result};
use studio_forms::flows::ESTIMATOR_TIMEOUT;

const DEFAULT_RELAY_URL: &str = "https://api.resend.com";
const DEFAULT_MAIL_FROM: &str = "Website <noreply@studio.dev>";
const DEFAULT_INBOX: &str = "hello@studio.dev";
/// Whole-call budget for the AI provider, retries included.
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 30;

/// Application configuration loaded from environment variables.
///
/// Collaborator credentials are optional at startup. A missing mail relay key
/// or AI key makes the corresponding endpoint fail closed per request instead
/// of keeping the whole site offline.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub mail_relay_url: String,
    pub mail_relay_api_key: Option<String>,
    pub mail_from: String,
    pub contact_inbox: String,
    pub careers_inbox: String,
    pub mail_timeout: Duration,
    pub anthropic_api_key: Option<String>,
    pub ai_timeout: Duration,
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            mail_relay_url: optional_env("MAIL_RELAY_URL")
                .unwrap_or_else(|| DEFAULT_RELAY_URL.to_string()),
            mail_relay_api_key: optional_env("MAIL_RELAY_API_KEY"),
            mail_from: optional_env("MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
            contact_inbox: optional_env("CONTACT_INBOX")
                .unwrap_or_else(|| DEFAULT_INBOX.to_string()),
            careers_inbox: optional_env("CAREERS_INBOX")
                .unwrap_or_else(|| DEFAULT_INBOX.to_string()),
            mail_timeout: seconds_env("MAIL_TIMEOUT_SECS", 8)?,
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            ai_timeout: seconds_env("AI_TIMEOUT_SECS", DEFAULT_AI_TIMEOUT_SECS)?,
            cors_origin: optional_env("CORS_ORIGIN"),
        };
        config.check()?;
        Ok(config)
    }

    /// CRITICAL: the server must give up on the provider before the browser
    /// gives up on the server, or both sides report different outcomes.
    fn check(&self) -> Result<()> {
        ensure!(
            self.ai_timeout < ESTIMATOR_TIMEOUT,
            "AI_TIMEOUT_SECS ({}s) must be below the estimator client timeout ({}s)",
            self.ai_timeout.as_secs(),
            ESTIMATOR_TIMEOUT.as_secs()
        );
        Ok(())
    }
}

/// Unset and blank both read as `None`.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn seconds_env(key: &str, default: u64) -> Result<Duration> {
    match optional_env(key) {
        Some(v) => v
            .parse::<u64>()
            .map(Duration::from_secs)
            .with_context(|| format!("{key} must be a whole number of seconds")),
        None => Ok(Duration::from_secs(default)),
    }
}

#[cfg(test)]
impl Config {
    /// Fully configured values for handler tests.
    pub fn for_tests() -> Self {
        Config {
            port: 0,
            rust_log: "debug".to_string(),
            mail_relay_url: "http://127.0.0.1:9".to_string(),
            mail_relay_api_key: Some("test-key".to_string()),
            mail_from: DEFAULT_MAIL_FROM.to_string(),
            contact_inbox: "contact@studio.test".to_string(),
            careers_inbox: "careers@studio.test".to_string(),
            mail_timeout: Duration::from_secs(1),
            anthropic_api_key: Some("test-key".to_string()),
            ai_timeout: Duration::from_secs(1),
            cors_origin: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ai_budget_fits_client_timeout() {
        let mut config = Config::for_tests();
        config.ai_timeout = Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS);
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_ai_budget_at_client_timeout_rejected() {
        let mut config = Config::for_tests();
        config.ai_timeout = ESTIMATOR_TIMEOUT;
        let err = config.check().unwrap_err();
        assert!(err.to_string().contains("AI_TIMEOUT_SECS"));
    }
}
