//! LLM Client: the single point of entry for generative AI calls.
//!
//! ARCHITECTURAL RULE: No other module may call the provider API directly.
//! Handlers depend on the `CompletionProvider` trait carried in `AppState`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for the project estimator. Hardcoded to prevent drift.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 2048;
/// Total attempts, first call included.
const MAX_ATTEMPTS: u32 = 2;
const BACKOFF: Duration = Duration::from_millis(750);

/// Sum of the sleeps between attempts.
fn total_backoff() -> Duration {
    (1..MAX_ATTEMPTS).map(|attempt| BACKOFF * attempt).sum()
}

/// Per-attempt timeout chosen so that every attempt plus the backoff between
/// them fits inside `budget`.
pub fn attempt_timeout(budget: Duration) -> Duration {
    budget.saturating_sub(total_backoff()) / MAX_ATTEMPTS
}

/// Longest a single `call` can take with the given budget.
pub fn worst_case(budget: Duration) -> Duration {
    attempt_timeout(budget) * MAX_ATTEMPTS + total_backoff()
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Provider unavailable after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// Content that arrived but could not be used, as opposed to transport
    /// or provider failures.
    pub fn is_malformed(&self) -> bool {
        matches!(self, LlmError::Parse(_) | LlmError::EmptyContent)
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [UserMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Anything that can turn a prompt into a JSON value. Carried in `AppState`
/// as `Arc<dyn CompletionProvider>` so handlers can be tested without the network.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete_json(&self, prompt: &str, system: &str) -> Result<Value, LlmError>;
}

/// Outcome of a single HTTP attempt.
enum Attempt {
    Done(LlmResponse),
    Retry(LlmError),
}

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl LlmClient {
    /// `budget` bounds the whole call, retries included.
    pub fn new(api_key: String, budget: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(attempt_timeout(budget))
                .build()
                .expect("Failed to build HTTP client"),
            endpoint: ANTHROPIC_API_URL.to_string(),
            api_key,
        }
    }

    #[cfg(test)]
    fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// One round trip. 429 and 5xx are retryable; other failures are final.
    async fn attempt(&self, body: &MessagesRequest<'_>) -> Result<Attempt, LlmError> {
        let response = match self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) if e.is_timeout() || e.is_connect() => return Ok(Attempt::Retry(e.into())),
            Err(e) => return Err(e.into()),
        };

        let status = response.status();
        if status.is_success() {
            // An unreadable envelope is malformed content, not a transport failure
            let raw = response.text().await?;
            return Ok(Attempt::Done(serde_json::from_str(&raw)?));
        }

        let raw = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ProviderError>(&raw)
            .map(|e| e.error.message)
            .unwrap_or(raw);
        let err = LlmError::Api {
            status: status.as_u16(),
            message,
        };

        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            warn!("LLM provider returned {status}, will retry");
            Ok(Attempt::Retry(err))
        } else {
            Err(err)
        }
    }

    /// Makes a raw call to the provider, returning the full response object.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let body = MessagesRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: [UserMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut last: Option<LlmError> = None;
        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(BACKOFF * attempt).await;
            }
            match self.attempt(&body).await? {
                Attempt::Done(response) => {
                    debug!(
                        input_tokens = response.usage.input_tokens,
                        output_tokens = response.usage.output_tokens,
                        "LLM call succeeded"
                    );
                    return Ok(response);
                }
                Attempt::Retry(e) => last = Some(e),
            }
        }

        Err(last.unwrap_or(LlmError::Exhausted {
            attempts: MAX_ATTEMPTS,
        }))
    }

    /// Calls the LLM and deserializes the text response as JSON.
    /// The prompt must instruct the model to return valid JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let response = self.call(prompt, system).await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?;
        serde_json::from_str(strip_json_fences(text)).map_err(LlmError::Parse)
    }
}

#[async_trait]
impl CompletionProvider for LlmClient {
    async fn complete_json(&self, prompt: &str, system: &str) -> Result<Value, LlmError> {
        self.call_json::<Value>(prompt, system).await
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    let inner = inner.trim_start();
    inner.strip_suffix("```").map(str::trim).unwrap_or(inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_unterminated() {
        let input = "```json\n{\"techStack\": []}";
        assert_eq!(strip_json_fences(input), "{\"techStack\": []}");
    }

    #[test]
    fn test_response_text_picks_first_text_block() {
        let response: LlmResponse = serde_json::from_str(
            r#"{"content":[{"type":"tool_use"},{"type":"text","text":"{}"}],"usage":{"input_tokens":3,"output_tokens":1}}"#,
        )
        .unwrap();
        assert_eq!(response.text(), Some("{}"));
    }

    #[test]
    fn test_retries_fit_inside_budget() {
        let budget = Duration::from_secs(crate::config::DEFAULT_AI_TIMEOUT_SECS);
        assert!(worst_case(budget) <= budget);
        assert!(budget < studio_forms::flows::ESTIMATOR_TIMEOUT);
        assert!(attempt_timeout(budget) * MAX_ATTEMPTS + BACKOFF <= budget);
    }

    #[test]
    fn test_tiny_budget_does_not_underflow() {
        assert_eq!(attempt_timeout(Duration::from_millis(100)), Duration::ZERO);
    }

    /// Serves `body` with 200 on an ephemeral port.
    async fn provider_replying(body: &'static str) -> String {
        let app = axum::Router::new().route("/v1/messages", axum::routing::post(move || async move { body }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1/messages")
    }

    #[tokio::test]
    async fn test_unreadable_success_envelope_is_malformed() {
        let endpoint = provider_replying("<html>gateway page</html>").await;
        let client = LlmClient::new("k".into(), Duration::from_secs(5)).with_endpoint(endpoint);

        let err = client.complete_json("idea", "system").await.unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)), "got {err:?}");
        assert!(err.is_malformed());
    }

    #[tokio::test]
    async fn test_success_envelope_parsed() {
        let endpoint = provider_replying(
            r#"{"content":[{"type":"text","text":"```json\n{\"ok\": true}\n```"}],"usage":{"input_tokens":1,"output_tokens":1}}"#,
        )
        .await;
        let client = LlmClient::new("k".into(), Duration::from_secs(5)).with_endpoint(endpoint);

        let value = client.complete_json("idea", "system").await.unwrap();
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn test_parse_failures_are_malformed() {
        let parse = serde_json::from_str::<Value>("nope").unwrap_err();
        assert!(LlmError::Parse(parse).is_malformed());
        assert!(LlmError::EmptyContent.is_malformed());
        assert!(!LlmError::Exhausted { attempts: 2 }.is_malformed());
    }
}
