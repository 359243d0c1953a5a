//! Per-flow configuration.
//!
//! One schema describes a whole flow: which fields it transmits, the rules
//! gating each step, the endpoint it posts to, and the optional decorative
//! progress ticker shown while the request is pending. The inquiry wizard,
//! the career application, and the AI estimator are all instances of this.

use std::collections::BTreeMap;
use std::time::Duration;

use thiserror::Error;

use crate::field::Field;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    Inquiry,
    Application,
    Estimator,
}

impl FlowKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FlowKind::Inquiry => "inquiry",
            FlowKind::Application => "application",
            FlowKind::Estimator => "estimator",
        }
    }
}

/// A single validation rule attached to a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Every listed field must be non-blank. One message names all that are missing.
    RequireText(Vec<Field>),
    /// Field must hold a plausible email address.
    RequireEmail(Field),
    /// Multi-select field must hold at least one identifier.
    RequireSelection { field: Field, message: String },
}

impl Rule {
    fn fields(&self) -> Vec<Field> {
        match self {
            Rule::RequireText(fields) => fields.clone(),
            Rule::RequireEmail(f) => vec![*f],
            Rule::RequireSelection { field, .. } => vec![*field],
        }
    }
}

/// Rules for one step, checked in declared order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepRules {
    pub title: String,
    pub rules: Vec<Rule>,
}

impl StepRules {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rules: Vec::new(),
        }
    }

    pub fn require_text(mut self, fields: &[Field]) -> Self {
        self.rules.push(Rule::RequireText(fields.to_vec()));
        self
    }

    pub fn require_email(mut self, field: Field) -> Self {
        self.rules.push(Rule::RequireEmail(field));
        self
    }

    pub fn require_selection(mut self, field: Field, message: impl Into<String>) -> Self {
        self.rules.push(Rule::RequireSelection {
            field,
            message: message.into(),
        });
        self
    }
}

/// Decorative phrases rotated while a request is pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressConfig {
    pub phrases: Vec<String>,
    pub interval: Duration,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("flow '{0}' has no steps")]
    NoSteps(&'static str),

    #[error("flow '{0}' has no endpoint")]
    NoEndpoint(&'static str),

    #[error("flow '{kind}' validates undeclared field '{field}'")]
    UndeclaredField { kind: &'static str, field: Field },

    #[error("flow '{0}' has an empty progress phrase list")]
    EmptyProgress(&'static str),
}

#[derive(Debug, Clone)]
pub struct FlowSchema {
    kind: FlowKind,
    endpoint: String,
    fields: Vec<Field>,
    steps: Vec<StepRules>,
    progress: Option<ProgressConfig>,
    metadata: BTreeMap<String, String>,
}

impl FlowSchema {
    pub fn builder(kind: FlowKind) -> FlowSchemaBuilder {
        FlowSchemaBuilder {
            kind,
            endpoint: None,
            fields: Vec::new(),
            steps: Vec::new(),
            progress: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of steps (N). Always at least 1.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Rules for a 1-based step index.
    pub fn step(&self, step: usize) -> Option<&StepRules> {
        step.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    pub fn progress(&self) -> Option<&ProgressConfig> {
        self.progress.as_ref()
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    /// Every field some `RequireText` rule names, across all steps.
    pub fn required_fields(&self) -> Vec<Field> {
        let mut out = Vec::new();
        for step in &self.steps {
            for rule in &step.rules {
                if let Rule::RequireText(fields) = rule {
                    for f in fields {
                        if !out.contains(f) {
                            out.push(*f);
                        }
                    }
                }
            }
        }
        out
    }
}

pub struct FlowSchemaBuilder {
    kind: FlowKind,
    endpoint: Option<String>,
    fields: Vec<Field>,
    steps: Vec<StepRules>,
    progress: Option<ProgressConfig>,
    metadata: BTreeMap<String, String>,
}

impl FlowSchemaBuilder {
    pub fn endpoint(mut self, path: impl Into<String>) -> Self {
        self.endpoint = Some(path.into());
        self
    }

    pub fn fields(mut self, fields: &[Field]) -> Self {
        self.fields = fields.to_vec();
        self
    }

    pub fn step(mut self, rules: StepRules) -> Self {
        self.steps.push(rules);
        self
    }

    pub fn progress<I, S>(mut self, phrases: I, interval: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.progress = Some(ProgressConfig {
            phrases: phrases.into_iter().map(Into::into).collect(),
            interval,
        });
        self
    }

    /// Extra key/value pairs merged into the outbound payload (e.g. `jobTitle`).
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> Result<FlowSchema, SchemaError> {
        let kind = self.kind.as_str();
        if self.steps.is_empty() {
            return Err(SchemaError::NoSteps(kind));
        }
        let endpoint = match self.endpoint {
            Some(e) if !e.trim().is_empty() => e,
            _ => return Err(SchemaError::NoEndpoint(kind)),
        };
        for step in &self.steps {
            for rule in &step.rules {
                if let Some(field) = rule.fields().into_iter().find(|f| !self.fields.contains(f)) {
                    return Err(SchemaError::UndeclaredField { kind, field });
                }
            }
        }
        if matches!(&self.progress, Some(p) if p.phrases.is_empty()) {
            return Err(SchemaError::EmptyProgress(kind));
        }

        Ok(FlowSchema {
            kind: self.kind,
            endpoint,
            fields: self.fields,
            steps: self.steps,
            progress: self.progress,
            metadata: self.metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_step() -> StepRules {
        StepRules::new("Contact").require_text(&[Field::Name])
    }

    #[test]
    fn test_build_requires_steps() {
        let err = FlowSchema::builder(FlowKind::Inquiry)
            .endpoint("/api/contact")
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::NoSteps("inquiry"));
    }

    #[test]
    fn test_build_requires_endpoint() {
        let err = FlowSchema::builder(FlowKind::Inquiry)
            .fields(&[Field::Name])
            .step(one_step())
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::NoEndpoint("inquiry"));
    }

    #[test]
    fn test_build_rejects_undeclared_field() {
        let err = FlowSchema::builder(FlowKind::Application)
            .endpoint("/api/careers/apply")
            .fields(&[Field::Email])
            .step(one_step())
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::UndeclaredField { field: Field::Name, .. }));
    }

    #[test]
    fn test_step_is_one_based() {
        let schema = FlowSchema::builder(FlowKind::Inquiry)
            .endpoint("/api/contact")
            .fields(&[Field::Name])
            .step(one_step())
            .build()
            .unwrap();
        assert!(schema.step(0).is_none());
        assert_eq!(schema.step(1).unwrap().title, "Contact");
        assert!(schema.step(2).is_none());
    }

    #[test]
    fn test_required_fields_deduplicated() {
        let schema = FlowSchema::builder(FlowKind::Application)
            .endpoint("/x")
            .fields(&[Field::Name, Field::Email])
            .step(StepRules::new("a").require_text(&[Field::Name, Field::Email]))
            .step(StepRules::new("b").require_text(&[Field::Name]))
            .build()
            .unwrap();
        assert_eq!(schema.required_fields(), vec![Field::Name, Field::Email]);
    }
}
