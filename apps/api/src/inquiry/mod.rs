// Project inquiries from the multi-step wizard.
// The server is the authoritative validator; client checks are a UX nicety.

pub mod handlers;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use studio_forms::flows::INQUIRY_REQUIRED;
use studio_forms::validator::{is_valid_email, missing_required};
use studio_forms::{catalog, Draft, Field, FieldValue, Timeline};
use uuid::Uuid;

use crate::errors::AppError;
use crate::mailer::templates::Notification;

/// `service` arrives as an array of identifiers; a lone string is accepted too.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(untagged)]
pub enum ServiceList {
    #[default]
    None,
    One(String),
    Many(Vec<String>),
}

impl ServiceList {
    pub fn ids(&self) -> Vec<String> {
        match self {
            ServiceList::None => Vec::new(),
            ServiceList::One(s) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            ServiceList::Many(v) => v.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub service: ServiceList,
    #[serde(default)]
    pub timeline: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ContactRequest {
    fn draft(&self) -> Draft {
        Draft::new()
            .with(Field::Name, FieldValue::text(&self.name))
            .with(Field::Email, FieldValue::text(&self.email))
    }

    /// Required name + email, then email format.
    pub fn validate(&self) -> Result<(), AppError> {
        let missing = missing_required(INQUIRY_REQUIRED, &self.draft());
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

    /// Services rendered as display labels, e.g. "Web Development, AI Integration".
    pub fn services_label(&self) -> String {
        catalog::render(self.service.ids())
    }

    pub fn timeline_label(&self) -> String {
        Timeline::describe(self.timeline.as_deref().unwrap_or_default())
    }

    pub fn notification(&self, reference: Uuid, submitted_at: DateTime<Utc>) -> Notification<'_> {
        let optional = |v: &Option<String>| v.as_deref().unwrap_or_default().trim().to_string();
        Notification {
            heading: "New Project Inquiry",
            subject: format!("New project inquiry from {}", self.name.trim()),
            reference,
            submitted_at,
            rows: vec![
                ("Name", self.name.trim().to_string()),
                ("Email", self.email.trim().to_string()),
                ("Phone", optional(&self.phone)),
                ("Company", optional(&self.company)),
                ("Services", self.services_label()),
                ("Timeline", self.timeline_label()),
            ],
            body: self.message.as_deref().map(|m| ("Message", m)),
        }
    }
}
