//! Form State Store. Holds the in-progress draft of one flow.
//!
//! The store is not a validation authority: any value is accepted for any
//! field. Derived facts ("is this step valid?") are computed on demand by the
//! validator and never cached here.

use std::collections::{BTreeMap, BTreeSet};

use crate::field::{Attachment, AttachmentError, Field, FieldValue, Timeline};

/// The unsubmitted value of a multi-field form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    fields: BTreeMap<Field, FieldValue>,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    /// Text content of a field. Absent or non-text fields read as "".
    pub fn text(&self, field: Field) -> &str {
        match self.fields.get(&field) {
            Some(FieldValue::Text(s)) => s,
            _ => "",
        }
    }

    pub fn selection(&self, field: Field) -> Option<&BTreeSet<String>> {
        match self.fields.get(&field) {
            Some(FieldValue::Selection(set)) => Some(set),
            _ => None,
        }
    }

    pub fn timeline(&self) -> Option<Timeline> {
        match self.fields.get(&Field::Timeline) {
            Some(FieldValue::Choice(choice)) => *choice,
            _ => None,
        }
    }

    pub fn attachment(&self, field: Field) -> Option<&Attachment> {
        match self.fields.get(&field) {
            Some(FieldValue::Attachment(a)) => a.as_ref(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Field, &FieldValue)> {
        self.fields.iter()
    }

    /// Returns a new draft with one field replaced.
    pub fn with(&self, field: Field, value: FieldValue) -> Self {
        let mut next = self.clone();
        next.fields.insert(field, value);
        next
    }
}

/// Owns a flow's draft plus the single error message currently shown for it.
#[derive(Debug, Default)]
pub struct FormStore {
    draft: Draft,
    error: Option<String>,
}

impl FormStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replaces one field and clears the current error, since the user is
    /// presumed to be correcting earlier input.
    pub fn set_field(&mut self, field: Field, value: FieldValue) {
        self.draft = self.draft.with(field, value);
        self.error = None;
    }

    /// Adds `id` to a multi-select field, or removes it if already present.
    pub fn toggle_selection(&mut self, field: Field, id: &str) {
        let mut set = self.draft.selection(field).cloned().unwrap_or_default();
        if !set.remove(id) {
            set.insert(id.to_string());
        }
        self.set_field(field, FieldValue::Selection(set));
    }

    /// Stores a prepared attachment. A rejected file never enters the draft;
    /// its error becomes the store's message instead.
    pub fn attach(&mut self, field: Field, attachment: Result<Attachment, AttachmentError>) {
        match attachment {
            Ok(a) => self.set_field(field, FieldValue::Attachment(Some(a))),
            Err(e) => {
                tracing::warn!(field = %field, "attachment rejected: {e}");
                self.error = Some(e.to_string());
            }
        }
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Discards the draft and any error.
    pub fn reset(&mut self) {
        self.draft = Draft::default();
        self.error = None;
    }
}
