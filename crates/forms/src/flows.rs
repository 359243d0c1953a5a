//! The three flows the site ships: the project-inquiry wizard, the career
//! application form, and the AI project estimator.

use std::time::Duration;

use crate::field::Field;
use crate::schema::{FlowKind, FlowSchema, StepRules};

pub const INQUIRY_ENDPOINT: &str = "/api/contact";
pub const APPLICATION_ENDPOINT: &str = "/api/careers/apply";
pub const ESTIMATOR_ENDPOINT: &str = "/api/ai";

pub const ESTIMATOR_PHRASES: [&str; 4] = [
    "Analyzing your idea...",
    "Evaluating technology options...",
    "Estimating complexity...",
    "Planning your timeline...",
];
pub const ESTIMATOR_TICK: Duration = Duration::from_secs(2);
/// The estimator waits on a model; give it longer than the form endpoints.
pub const ESTIMATOR_TIMEOUT: Duration = Duration::from_secs(45);

pub const INQUIRY_FIELDS: &[Field] = &[
    Field::Services,
    Field::Timeline,
    Field::Message,
    Field::Name,
    Field::Email,
    Field::Phone,
    Field::Company,
];

pub const APPLICATION_FIELDS: &[Field] = &[
    Field::Name,
    Field::Email,
    Field::Phone,
    Field::Portfolio,
    Field::CoverLetter,
    Field::Resume,
];

/// Name, email, and phone; the server answers 400 when any is blank.
pub const APPLICATION_REQUIRED: &[Field] = &[Field::Name, Field::Email, Field::Phone];
pub const INQUIRY_REQUIRED: &[Field] = &[Field::Name, Field::Email];

// Built from constants only, so a build failure is a programming error.
fn finish(builder: crate::schema::FlowSchemaBuilder) -> FlowSchema {
    match builder.build() {
        Ok(schema) => schema,
        Err(e) => panic!("built-in flow schema is invalid: {e}"),
    }
}

/// Three steps: services, project details, contact details.
pub fn inquiry_schema() -> FlowSchema {
    finish(
        FlowSchema::builder(FlowKind::Inquiry)
            .endpoint(INQUIRY_ENDPOINT)
            .fields(INQUIRY_FIELDS)
            .step(StepRules::new("Services").require_selection(
                Field::Services,
                "Please select at least one service",
            ))
            .step(StepRules::new("Project details"))
            .step(
                StepRules::new("Contact details")
                    .require_text(INQUIRY_REQUIRED)
                    .require_email(Field::Email),
            ),
    )
}

pub fn application_schema(job_title: &str, department: &str) -> FlowSchema {
    finish(
        FlowSchema::builder(FlowKind::Application)
            .endpoint(APPLICATION_ENDPOINT)
            .fields(APPLICATION_FIELDS)
            .step(
                StepRules::new("Application")
                    .require_text(APPLICATION_REQUIRED)
                    .require_email(Field::Email),
            )
            .metadata("jobTitle", job_title)
            .metadata("department", department),
    )
}

pub fn estimator_schema() -> FlowSchema {
    finish(
        FlowSchema::builder(FlowKind::Estimator)
            .endpoint(ESTIMATOR_ENDPOINT)
            .fields(&[Field::Prompt])
            .step(StepRules::new("Describe your project").require_text(&[Field::Prompt]))
            .progress(ESTIMATOR_PHRASES, ESTIMATOR_TICK),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_preset_builds() {
        let presets = [
            inquiry_schema(),
            application_schema("Rust Engineer", "Engineering"),
            application_schema("", ""),
            estimator_schema(),
        ];
        for schema in &presets {
            assert!(schema.step_count() >= 1);
            assert!(schema.endpoint().starts_with("/api/"));
            assert!(!schema.required_fields().is_empty());
        }
    }

    #[test]
    fn test_inquiry_has_three_steps() {
        let schema = inquiry_schema();
        assert_eq!(schema.step_count(), 3);
        assert_eq!(schema.endpoint(), INQUIRY_ENDPOINT);
        assert_eq!(schema.required_fields(), INQUIRY_REQUIRED.to_vec());
    }

    #[test]
    fn test_application_carries_job_metadata() {
        let schema = application_schema("Rust Engineer", "Engineering");
        assert_eq!(schema.step_count(), 1);
        assert_eq!(schema.metadata()["jobTitle"], "Rust Engineer");
        assert_eq!(schema.required_fields(), APPLICATION_REQUIRED.to_vec());
    }

    #[test]
    fn test_estimator_has_ticker() {
        let schema = estimator_schema();
        let progress = schema.progress().unwrap();
        assert_eq!(progress.phrases.len(), 4);
        assert_eq!(progress.interval, ESTIMATOR_TICK);
        assert!(ESTIMATOR_TIMEOUT > crate::submission::DEFAULT_TIMEOUT);
    }
}
