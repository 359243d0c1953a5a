//! Outbound email through an HTTP mail relay.
//!
//! The relay is the only place submissions are persisted. Handlers build an
//! `OutgoingEmail` and hand it to the `Mailer` carried in `AppState`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

pub mod templates;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail relay timed out")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("mail relay rejected message (status {status}): {message}")]
    Rejected { status: u16, message: String },
}

impl From<reqwest::Error> for MailError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            MailError::Timeout
        } else {
            MailError::Http(e)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailAttachment {
    pub filename: String,
    /// Base64 content, as the relay expects it.
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub to: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<EmailAttachment>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends one message. Returns the relay's message id when it gives one.
    async fn send(&self, email: OutgoingEmail) -> Result<Option<String>, MailError>;
}

#[derive(Serialize)]
struct RelayRequest<'a> {
    from: &'a str,
    #[serde(flatten)]
    email: &'a OutgoingEmail,
}

#[derive(serde::Deserialize)]
struct RelayResponse {
    id: Option<String>,
}

/// Relay speaking the common `POST /emails` JSON API with a bearer key.
#[derive(Clone)]
pub struct RelayMailer {
    client: Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl RelayMailer {
    pub fn new(base_url: &str, api_key: String, from: String, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .connect_timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            endpoint: format!("{}/emails", base_url.trim_end_matches('/')),
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Mailer for RelayMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<Option<String>, MailError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&RelayRequest {
                from: &self.from,
                email: &email,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "mail relay rejected message");
            return Err(MailError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let id = response
            .json::<RelayResponse>()
            .await
            .ok()
            .and_then(|r| r.id);
        info!(relay_id = ?id, attachments = email.attachments.len(), "email handed to relay");
        Ok(id)
    }
}
