use axum::{extract::State, Json};
use chrono::Utc;
use studio_forms::Acknowledgement;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::inquiry::ContactRequest;
use crate::state::AppState;

/// POST /api/contact
pub async fn handle_contact(
    State(state): State<AppState>,
    AppJson(request): AppJson<ContactRequest>,
) -> Result<Json<Acknowledgement>, AppError> {
    request.validate()?;
    let mailer = state.mailer()?;

    let reference = Uuid::new_v4();
    let email = request.notification(reference, Utc::now()).into_email(
        &state.config.contact_inbox,
        Some(request.email.trim()),
        Vec::new(),
    );
    mailer.send(email).await?;

    info!(%reference, services = request.service.ids().len(), "inquiry relayed");
    Ok(Json(Acknowledgement {
        success: true,
        message: Some("Thanks for reaching out! We'll get back to you within 24 hours.".to_string()),
        reference: Some(reference.to_string()),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;

    use crate::mailer::testing::RecordingMailer;
    use crate::routes::test_support::{post_json, state_with};

    #[tokio::test]
    async fn test_contact_relays_email() {
        let mailer = Arc::new(RecordingMailer::default());
        let state = state_with(Some(mailer.clone()), None);

        let (status, body) = post_json(
            state,
            "/api/contact",
            json!({
                "name": "Jane Doe",
                "email": "jane@example.com",
                "service": ["web", "ai"],
                "timeline": ""
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body["reference"].is_string());

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["contact@studio.test".to_string()]);
        assert_eq!(sent[0].reply_to.as_deref(), Some("jane@example.com"));
        assert!(sent[0].text.contains("Services: Web Development, AI Integration"));
        assert!(sent[0].text.contains("Timeline: Not specified"));
    }

    #[tokio::test]
    async fn test_contact_without_services_accepted() {
        let mailer = Arc::new(RecordingMailer::default());
        let (status, _) = post_json(
            state_with(Some(mailer.clone()), None),
            "/api/contact",
            json!({ "name": "Jane Doe", "email": "jane@example.com" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(mailer.sent()[0].text.contains("Services: Not specified"));
    }

    #[tokio::test]
    async fn test_contact_undotted_domain_rejected() {
        let (status, body) = post_json(
            state_with(Some(Arc::new(RecordingMailer::default())), None),
            "/api/contact",
            json!({ "name": "Jane", "email": "jane@localhost" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Please enter a valid email address");
    }

    #[tokio::test]
    async fn test_contact_missing_fields_is_400() {
        let mailer = Arc::new(RecordingMailer::default());
        let state = state_with(Some(mailer.clone()), None);

        let (status, body) = post_json(state, "/api/contact", json!({ "name": "Jane" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["missingFields"], json!(["email"]));
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_contact_without_relay_fails_closed() {
        let (status, body) = post_json(
            state_with(None, None),
            "/api/contact",
            json!({ "name": "Jane", "email": "jane@example.com" }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "CONFIGURATION_ERROR");
    }

    #[tokio::test]
    async fn test_contact_relay_failure_is_502() {
        let state = state_with(Some(Arc::new(RecordingMailer::failing())), None);
        let (status, body) = post_json(
            state,
            "/api/contact",
            json!({ "name": "Jane", "email": "jane@example.com" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "MAIL_ERROR");
    }
}
