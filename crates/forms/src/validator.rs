//! Step-scoped validation.
//!
//! A step only checks the rules declared for it, so a visitor never sees an
//! error about a field they have not reached yet. Each check yields at most
//! one message.

use thiserror::Error;
use validator::ValidateEmail;

use crate::draft::Draft;
use crate::field::Field;
use crate::schema::{FlowSchema, Rule};

/// A failed step check. `missing` lists blank required fields, if any.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub step: usize,
    pub message: String,
    pub missing: Vec<Field>,
}

impl ValidationError {
    fn new(step: usize, message: impl Into<String>) -> Self {
        Self {
            step,
            message: message.into(),
            missing: Vec::new(),
        }
    }
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Blank required text fields, in the order given.
pub fn missing_required(fields: &[Field], draft: &Draft) -> Vec<Field> {
    fields
        .iter()
        .copied()
        .filter(|f| is_blank(draft.text(*f)))
        .collect()
}

/// RFC syntax via `validator`, plus a dotted domain: the site never accepts
/// bare intranet hosts like `jane@localhost`.
pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    if !value.validate_email() {
        return false;
    }
    value
        .rsplit_once('@')
        .is_some_and(|(_, domain)| domain.contains('.'))
}

fn missing_message(missing: &[Field]) -> String {
    let labels: Vec<&str> = missing.iter().map(|f| f.label()).collect();
    format!("Please fill in all required fields: {}", labels.join(", "))
}

fn check_rule(step: usize, rule: &Rule, draft: &Draft) -> Result<(), ValidationError> {
    match rule {
        Rule::RequireText(fields) => {
            let missing = missing_required(fields, draft);
            if missing.is_empty() {
                Ok(())
            } else {
                Err(ValidationError {
                    step,
                    message: missing_message(&missing),
                    missing,
                })
            }
        }
        Rule::RequireEmail(field) => {
            if is_valid_email(draft.text(*field)) {
                Ok(())
            } else {
                Err(ValidationError::new(
                    step,
                    "Please enter a valid email address",
                ))
            }
        }
        Rule::RequireSelection { field, message } => {
            match draft.selection(*field) {
                Some(set) if set.iter().any(|id| !is_blank(id)) => Ok(()),
                _ => Err(ValidationError::new(step, message.clone())),
            }
        }
    }
}

/// Checks one 1-based step. Returns the first failing rule's message.
/// Steps outside the schema have no rules and pass.
pub fn validate_step(schema: &FlowSchema, step: usize, draft: &Draft) -> Result<(), ValidationError> {
    let Some(rules) = schema.step(step) else {
        return Ok(());
    };
    for rule in &rules.rules {
        check_rule(step, rule, draft)?;
    }
    Ok(())
}

/// Checks every step in order. Used before submission and for server-side
/// re-validation.
pub fn validate_all(schema: &FlowSchema, draft: &Draft) -> Result<(), ValidationError> {
    for step in 1..=schema.step_count() {
        validate_step(schema, step, draft)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldValue;
    use crate::flows::{application_schema, inquiry_schema};

    fn draft(pairs: &[(Field, &str)]) -> Draft {
        pairs
            .iter()
            .fold(Draft::new(), |d, (f, v)| d.with(*f, FieldValue::text(*v)))
    }

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("jane@example.com"));
        assert!(is_valid_email("x@y.com"));
        assert!(is_valid_email(" jane.doe+tag@mail.example.co.uk "));
    }

    #[test]
    fn test_invalid_emails() {
        for bad in ["", "jane", "@example.com", "jane@", "jane@example", "jane@@x.com", "ja ne@x.com", "jane@x..com", "jane@localhost"] {
            assert!(!is_valid_email(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_whitespace_only_is_blank() {
        let d = draft(&[(Field::Name, "   \t"), (Field::Email, "x@y.com"), (Field::Phone, "555")]);
        let err = validate_step(&application_schema("Designer", "Design"), 1, &d).unwrap_err();
        assert_eq!(err.missing, vec![Field::Name]);
    }

    #[test]
    fn test_application_missing_name_is_identified() {
        let d = draft(&[(Field::Name, ""), (Field::Email, "x@y.com"), (Field::Phone, "555")]);
        let err = validate_all(&application_schema("Designer", "Design"), &d).unwrap_err();
        assert!(err.message.contains("Full Name"));
        assert_eq!(err.missing, vec![Field::Name]);
    }

    #[test]
    fn test_one_message_for_several_missing_fields() {
        let err = validate_all(&application_schema("Designer", "Design"), &Draft::new()).unwrap_err();
        assert_eq!(err.missing, vec![Field::Name, Field::Email, Field::Phone]);
        assert_eq!(
            err.message,
            "Please fill in all required fields: Full Name, Email, Phone"
        );
    }

    #[test]
    fn test_optional_fields_never_fail() {
        let d = draft(&[
            (Field::Name, "Jane"),
            (Field::Email, "jane@example.com"),
            (Field::Phone, "555"),
            (Field::Portfolio, "not a url at all"),
            (Field::CoverLetter, ""),
        ]);
        assert!(validate_all(&application_schema("Designer", "Design"), &d).is_ok());
    }

    #[test]
    fn test_inquiry_step_one_only_checks_services() {
        let schema = inquiry_schema();
        let err = validate_step(&schema, 1, &Draft::new()).unwrap_err();
        assert_eq!(err.step, 1);
        assert!(err.message.contains("service"));
        assert!(err.missing.is_empty());
    }

    #[test]
    fn test_empty_selection_fails() {
        let d = Draft::new().with(Field::Services, FieldValue::selection(Vec::<String>::new()));
        assert!(validate_step(&inquiry_schema(), 1, &d).is_err());
    }

    #[test]
    fn test_inquiry_step_three_does_not_require_services() {
        let d = draft(&[(Field::Name, "Jane Doe"), (Field::Email, "jane@example.com")]);
        assert!(validate_step(&inquiry_schema(), 3, &d).is_ok());
    }

    #[test]
    fn test_inquiry_bad_email_reported_after_presence() {
        let d = draft(&[(Field::Name, "Jane Doe"), (Field::Email, "jane")]);
        let err = validate_step(&inquiry_schema(), 3, &d).unwrap_err();
        assert_eq!(err.message, "Please enter a valid email address");
    }

    #[test]
    fn test_step_outside_schema_passes() {
        assert!(validate_step(&inquiry_schema(), 9, &Draft::new()).is_ok());
    }
}
