// Career applications: one form per job listing, optional resume attachment.

pub mod handlers;
pub mod resume;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use studio_forms::flows::APPLICATION_REQUIRED;
use studio_forms::validator::{is_valid_email, missing_required};
use studio_forms::{Draft, Field, FieldValue};
use uuid::Uuid;

use crate::errors::AppError;
use crate::mailer::templates::Notification;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub portfolio: Option<String>,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub resume_file_name: Option<String>,
    /// Base64, optionally as a data URI.
    #[serde(default)]
    pub resume_file: Option<String>,
}

impl ApplicationRequest {
    fn draft(&self) -> Draft {
        Draft::new()
            .with(Field::Name, FieldValue::text(&self.name))
            .with(Field::Email, FieldValue::text(&self.email))
            .with(Field::Phone, FieldValue::text(&self.phone))
    }

    /// Required name, email, phone; then email format.
    pub fn validate(&self) -> Result<(), AppError> {
        let missing = missing_required(APPLICATION_REQUIRED, &self.draft());
        if !missing.is_empty() {
            return Err(AppError::MissingFields(
                missing.into_iter().map(Field::wire_name).collect(),
            ));
        }
        if !is_valid_email(&self.email) {
            return Err(AppError::Validation(
                "Please enter a valid email address".to_string(),
            ));
        }
        Ok(())
    }

    pub fn position(&self) -> &str {
        self.job_title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("General application")
    }

    pub fn notification(
        &self,
        reference: Uuid,
        submitted_at: DateTime<Utc>,
        resume_name: Option<&str>,
    ) -> Notification<'_> {
        let optional = |v: &Option<String>| v.as_deref().unwrap_or_default().trim().to_string();
        Notification {
            heading: "New Job Application",
            subject: format!("Application: {} - {}", self.position(), self.name.trim()),
            reference,
            submitted_at,
            rows: vec![
                ("Position", self.position().to_string()),
                ("Department", optional(&self.department)),
                ("Name", self.name.trim().to_string()),
                ("Email", self.email.trim().to_string()),
                ("Phone", self.phone.trim().to_string()),
                ("Portfolio", optional(&self.portfolio)),
                ("Resume", resume_name.unwrap_or("Not attached").to_string()),
            ],
            body: self.cover_letter.as_deref().map(|c| ("Cover Letter", c)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(v: serde_json::Value) -> ApplicationRequest {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_camel_case_fields() {
        let req = request(json!({
            "name": "Sam",
            "email": "sam@example.com",
            "phone": "555",
            "coverLetter": "Hello",
            "jobTitle": "Rust Engineer",
            "resumeFileName": "cv.pdf"
        }));
        assert_eq!(req.cover_letter.as_deref(), Some("Hello"));
        assert_eq!(req.position(), "Rust Engineer");
        assert_eq!(req.resume_file_name.as_deref(), Some("cv.pdf"));
    }

    #[test]
    fn test_missing_fields_in_declared_order() {
        let err = request(json!({ "email": "sam@example.com" }))
            .validate()
            .unwrap_err();
        match err {
            AppError::MissingFields(fields) => assert_eq!(fields, vec!["name", "phone"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_bad_email_after_required() {
        let err = request(json!({ "name": "Sam", "email": "nope", "phone": "555" }))
            .validate()
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_notification_defaults() {
        let req = request(json!({ "name": "Sam", "email": "sam@example.com", "phone": "555" }));
        let n = req.notification(Uuid::nil(), Utc::now(), None);
        assert!(n.subject.contains("General application"));
        assert!(n.rows.contains(&("Resume", "Not attached".to_string())));
        assert!(n.body.is_none());
    }
}
