use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use studio_forms::submission::CONFIGURATION_CODE;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::mailer::MailError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Body shape: `{ "error": "<message>", "code": "<CODE>" }`, plus
/// `missingFields` when required fields were blank.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// The body was not JSON of the expected shape.
    #[error("Invalid request body: {message}")]
    InvalidBody { status: StatusCode, message: String },

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// A collaborator's credentials are not set. Fails closed.
    #[error("{0} is not configured")]
    Configuration(&'static str),

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Malformed upstream response: {0}")]
    MalformedUpstream(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::MissingFields(fields) => {
                tracing::warn!(?fields, "rejected submission with missing fields");
                (
                    StatusCode::BAD_REQUEST,
                    "MISSING_FIELDS",
                    format!("Missing required fields: {}", fields.join(", ")),
                )
            }
            AppError::InvalidBody { status, message } => {
                tracing::warn!(%status, "rejected unreadable request body");
                (*status, "INVALID_BODY", message.clone())
            }
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::Configuration(what) => {
                tracing::error!("{what} is not configured; rejecting request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    CONFIGURATION_CODE,
                    "This service is not configured. Please contact us directly.".to_string(),
                )
            }
            AppError::Mail(e) => {
                tracing::error!("Mail relay error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MAIL_ERROR",
                    "Failed to send your message. Please try again later.".to_string(),
                )
            }
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "AI_ERROR",
                    "Failed to analyze your project. Please try again.".to_string(),
                )
            }
            AppError::MalformedUpstream(msg) => {
                tracing::error!(kind = "malformed_upstream", "Malformed provider response: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MALFORMED_RESPONSE",
                    "Failed to analyze your project. Please try again.".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let AppError::MissingFields(fields) = &self {
            body["missingFields"] = json!(fields);
        }

        (status, Json(body)).into_response()
    }
}

/// Extractor rejections (wrong types, missing content type, body over the
/// route limit) answer with the same JSON body as every other error.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let status = rejection.status();
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge("Request body is too large".to_string());
        }
        AppError::InvalidBody {
            status,
            message: rejection.body_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_of(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_missing_fields_lists_names() {
        let (status, body) = body_of(AppError::MissingFields(vec!["name", "phone"])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["missingFields"], json!(["name", "phone"]));
        assert_eq!(body["error"], "Missing required fields: name, phone");
    }

    #[tokio::test]
    async fn test_configuration_fails_closed_with_code() {
        let (status, body) = body_of(AppError::Configuration("Mail relay")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], CONFIGURATION_CODE);
        assert!(!body["error"].as_str().unwrap().contains("relay"));
    }

    #[tokio::test]
    async fn test_invalid_body_keeps_rejection_status() {
        let (status, body) = body_of(AppError::InvalidBody {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "name: invalid type".to_string(),
        })
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "INVALID_BODY");
        assert_eq!(body["error"], "name: invalid type");
    }

    #[tokio::test]
    async fn test_internal_details_not_leaked() {
        let (_, body) = body_of(AppError::Internal(anyhow::anyhow!("secret stack"))).await;
        assert!(!body["error"].as_str().unwrap().contains("secret"));
        assert!(body.get("missingFields").is_none());
    }
}
