//! Submission Client: turns a finished draft into exactly one POST and
//! classifies the outcome.
//!
//! No automatic retry. A timeout is a `Network` error like any other
//! connectivity failure.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::draft::Draft;
use crate::field::{Field, FieldValue};
use crate::schema::FlowSchema;

/// Bounded transport timeout so a stalled collaborator cannot pin a flow in Pending.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

/// Error code the API uses when a collaborator is not set up.
pub const CONFIGURATION_CODE: &str = "CONFIGURATION_ERROR";

const GENERIC_RETRY_MESSAGE: &str = "Something went wrong. Please try again.";
const UNAVAILABLE_MESSAGE: &str =
    "This form is temporarily unavailable. Please email us directly instead.";

/// Implemented by every response body a flow accepts as success.
pub trait ResponseShape {
    fn check(&self) -> Result<(), String>;
}

/// Plain success acknowledgement from the inquiry and application endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl ResponseShape for Acknowledgement {
    fn check(&self) -> Result<(), String> {
        if self.success {
            Ok(())
        } else {
            Err("acknowledgement without success flag".to_string())
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmissionError {
    /// Collaborator not set up. Fatal for this flow; not user-actionable.
    #[error("collaborator not configured: {0}")]
    Configuration(String),

    /// Payload rejected. The message is shown verbatim.
    #[error("{0}")]
    Validation(String),

    /// Timeout, connectivity, or an unexplained server failure.
    #[error("network error: {0}")]
    Network(String),

    /// Success status, but a body the flow cannot accept.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl SubmissionError {
    /// The single line shown to the visitor.
    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::Configuration(_) => UNAVAILABLE_MESSAGE.to_string(),
            SubmissionError::Validation(msg) => msg.clone(),
            SubmissionError::Network(_) | SubmissionError::MalformedResponse(_) => {
                GENERIC_RETRY_MESSAGE.to_string()
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SubmissionError::Network(_) | SubmissionError::MalformedResponse(_)
        )
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    code: Option<String>,
}

/// Builds the wire payload for a draft. Only fields the schema declares are
/// sent; blank text is omitted; schema metadata is merged last.
pub fn payload(schema: &FlowSchema, draft: &Draft) -> Value {
    let mut out = Map::new();
    for field in schema.fields() {
        match (field, draft.get(*field)) {
            (Field::Resume, Some(FieldValue::Attachment(Some(a)))) => {
                out.insert("resumeFile".into(), Value::String(a.content_base64.clone()));
                out.insert("resumeFileName".into(), Value::String(a.file_name.clone()));
            }
            (Field::Services, value) => {
                let ids = match value {
                    Some(FieldValue::Selection(set)) => set.iter().cloned().map(Value::String).collect(),
                    _ => Vec::new(),
                };
                out.insert(field.wire_name().into(), Value::Array(ids));
            }
            (Field::Timeline, _) => {
                let id = draft.timeline().map(|t| t.id()).unwrap_or_default();
                out.insert(field.wire_name().into(), Value::String(id.to_string()));
            }
            (_, Some(FieldValue::Text(text))) if !text.trim().is_empty() => {
                out.insert(field.wire_name().into(), Value::String(text.trim().to_string()));
            }
            _ => {}
        }
    }
    for (key, value) in schema.metadata() {
        out.insert(key.clone(), Value::String(value.clone()));
    }
    Value::Object(out)
}

#[derive(Clone)]
pub struct SubmissionClient {
    client: Client,
    base_url: String,
}

impl SubmissionClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Issues one POST and classifies the result.
    pub async fn send<R>(&self, endpoint: &str, body: &Value) -> Result<R, SubmissionError>
    where
        R: DeserializeOwned + ResponseShape,
    {
        let url = self.url(endpoint);
        let response = self.client.post(&url).json(body).send().await.map_err(|e| {
            warn!(%url, "submission transport failure: {e}");
            if e.is_timeout() {
                SubmissionError::Network("request timed out".to_string())
            } else {
                SubmissionError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SubmissionError::Network(e.to_string()))?;

        if status.is_success() {
            let parsed: R = serde_json::from_str(&text).map_err(|e| {
                error!(%url, "undecodable success body: {e}");
                SubmissionError::MalformedResponse(e.to_string())
            })?;
            parsed.check().map_err(|reason| {
                error!(%url, "response failed shape check: {reason}");
                SubmissionError::MalformedResponse(reason)
            })?;
            info!(%url, "submission accepted");
            return Ok(parsed);
        }

        Err(classify(status, &text))
    }
}

fn classify(status: StatusCode, text: &str) -> SubmissionError {
    let body: ErrorBody = serde_json::from_str(text).unwrap_or_default();
    let message = body
        .error
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));

    if status.is_client_error() {
        warn!(status = status.as_u16(), "submission rejected: {message}");
        SubmissionError::Validation(message)
    } else if body.code.as_deref() == Some(CONFIGURATION_CODE) {
        error!(status = status.as_u16(), "collaborator not configured: {message}");
        SubmissionError::Configuration(message)
    } else {
        warn!(status = status.as_u16(), "submission failed: {message}");
        SubmissionError::Network(message)
    }
}
