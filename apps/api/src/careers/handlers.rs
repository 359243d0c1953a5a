use axum::{extract::State, Json};
use chrono::Utc;
use studio_forms::Acknowledgement;
use tracing::info;
use uuid::Uuid;

use crate::careers::resume::decode_resume;
use crate::careers::ApplicationRequest;
use crate::errors::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

/// POST /api/careers/apply
pub async fn handle_apply(
    State(state): State<AppState>,
    AppJson(request): AppJson<ApplicationRequest>,
) -> Result<Json<Acknowledgement>, AppError> {
    request.validate()?;
    let resume = decode_resume(
        request.resume_file.as_deref(),
        request.resume_file_name.as_deref(),
    )?;
    let mailer = state.mailer()?;

    let reference = Uuid::new_v4();
    let attachments = resume.iter().map(|r| r.to_attachment()).collect();
    let email = request
        .notification(
            reference,
            Utc::now(),
            resume.as_ref().map(|r| r.file_name.as_str()),
        )
        .into_email(
            &state.config.careers_inbox,
            Some(request.email.trim()),
            attachments,
        );
    mailer.send(email).await?;

    info!(
        %reference,
        position = request.position(),
        resume_bytes = resume.as_ref().map(|r| r.content.len()).unwrap_or(0),
        "application relayed"
    );
    Ok(Json(Acknowledgement {
        success: true,
        message: Some("Application submitted successfully! We'll be in touch soon.".to_string()),
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
    async fn test_apply_attaches_resume() {
        let mailer = Arc::new(RecordingMailer::default());
        let state = state_with(Some(mailer.clone()), None);

        let (status, body) = post_json(
            state,
            "/api/careers/apply",
            json!({
                "name": "Sam Lee",
                "email": "sam@example.com",
                "phone": "+1 555 0100",
                "jobTitle": "Rust Engineer",
                "department": "Engineering",
                "resumeFileName": "cv.pdf",
                "resumeFile": "data:application/pdf;base64,aGVsbG8="
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["careers@studio.test".to_string()]);
        assert_eq!(sent[0].attachments.len(), 1);
        assert_eq!(sent[0].attachments[0].filename, "cv.pdf");
        assert_eq!(sent[0].attachments[0].content, "aGVsbG8=");
        assert!(sent[0].subject.contains("Rust Engineer"));
    }

    #[tokio::test]
    async fn test_apply_lists_missing_fields() {
        let mailer = Arc::new(RecordingMailer::default());
        let (status, body) = post_json(
            state_with(Some(mailer.clone()), None),
            "/api/careers/apply",
            json!({ "email": "sam@example.com" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["missingFields"], json!(["name", "phone"]));
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_apply_rejects_bad_base64() {
        let (status, body) = post_json(
            state_with(Some(Arc::new(RecordingMailer::default())), None),
            "/api/careers/apply",
            json!({
                "name": "Sam",
                "email": "sam@example.com",
                "phone": "555",
                "resumeFile": "%%%"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_apply_without_relay_fails_closed() {
        let (status, body) = post_json(
            state_with(None, None),
            "/api/careers/apply",
            json!({ "name": "Sam", "email": "sam@example.com", "phone": "555" }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "CONFIGURATION_ERROR");
    }
}
