//! The fixed field set shared by every flow, and the values a field can hold.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound for an attached file (5 MiB). Checked before the file is read.
pub const MAX_ATTACHMENT_BYTES: u64 = 5 * 1024 * 1024;

/// Every field a flow may carry. Flows pick a subset through their schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    Name,
    Email,
    Phone,
    Company,
    Portfolio,
    Message,
    CoverLetter,
    Services,
    Timeline,
    Resume,
    Prompt,
}

impl Field {
    /// Key used on the wire and in `missingFields` lists.
    pub fn wire_name(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Company => "company",
            Field::Portfolio => "portfolio",
            Field::Message => "message",
            Field::CoverLetter => "coverLetter",
            Field::Services => "service",
            Field::Timeline => "timeline",
            Field::Resume => "resume",
            Field::Prompt => "prompt",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Full Name",
            Field::Email => "Email",
            Field::Phone => "Phone",
            Field::Company => "Company",
            Field::Portfolio => "Portfolio URL",
            Field::Message => "Message",
            Field::CoverLetter => "Cover Letter",
            Field::Services => "Services",
            Field::Timeline => "Timeline",
            Field::Resume => "Resume",
            Field::Prompt => "Project Description",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Timeline buckets offered by the inquiry wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeline {
    #[serde(rename = "asap")]
    Asap,
    #[serde(rename = "1-3-months")]
    OneToThreeMonths,
    #[serde(rename = "3-6-months")]
    ThreeToSixMonths,
    #[serde(rename = "6-months-plus")]
    SixMonthsPlus,
    #[serde(rename = "flexible")]
    Flexible,
}

impl Timeline {
    pub const ALL: [Timeline; 5] = [
        Timeline::Asap,
        Timeline::OneToThreeMonths,
        Timeline::ThreeToSixMonths,
        Timeline::SixMonthsPlus,
        Timeline::Flexible,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Timeline::Asap => "asap",
            Timeline::OneToThreeMonths => "1-3-months",
            Timeline::ThreeToSixMonths => "3-6-months",
            Timeline::SixMonthsPlus => "6-months-plus",
            Timeline::Flexible => "flexible",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Timeline::Asap => "ASAP",
            Timeline::OneToThreeMonths => "1-3 months",
            Timeline::ThreeToSixMonths => "3-6 months",
            Timeline::SixMonthsPlus => "6+ months",
            Timeline::Flexible => "Flexible",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id() == id.trim())
    }

    /// Display text for a raw identifier as received on the wire.
    pub fn describe(id: &str) -> String {
        match Self::from_id(id) {
            Some(t) => t.label().to_string(),
            None if id.trim().is_empty() => "Not specified".to_string(),
            None => id.trim().to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttachmentError {
    #[error("File is too large ({size} bytes). Maximum size is 5MB.")]
    TooLarge { size: u64 },

    #[error("Attachment must have a file name")]
    MissingName,

    #[error("Could not read file: {0}")]
    Unreadable(String),
}

/// A file carried in a draft as base64 text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub size: u64,
    pub content_base64: String,
}

impl Attachment {
    /// Rejects a file by its declared size alone. Nothing has been read yet.
    pub fn check_declared(file_name: &str, size: u64) -> Result<(), AttachmentError> {
        if file_name.trim().is_empty() {
            return Err(AttachmentError::MissingName);
        }
        if size > MAX_ATTACHMENT_BYTES {
            return Err(AttachmentError::TooLarge { size });
        }
        Ok(())
    }

    pub fn from_bytes(file_name: &str, bytes: &[u8]) -> Result<Self, AttachmentError> {
        let size = bytes.len() as u64;
        Self::check_declared(file_name, size)?;
        Ok(Self {
            file_name: file_name.trim().to_string(),
            size,
            content_base64: STANDARD.encode(bytes),
        })
    }

    /// Reads a file from disk. The size comes from metadata, so an oversized
    /// file is never opened for reading.
    pub fn from_path(path: &Path) -> Result<Self, AttachmentError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let size = std::fs::metadata(path)
            .map_err(|e| AttachmentError::Unreadable(e.to_string()))?
            .len();
        Self::check_declared(&file_name, size)?;

        let bytes = std::fs::read(path).map_err(|e| AttachmentError::Unreadable(e.to_string()))?;
        Self::from_bytes(&file_name, &bytes)
    }
}

/// The value held by one field of a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Selection(BTreeSet<String>),
    Choice(Option<Timeline>),
    Attachment(Option<Attachment>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn selection<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::Selection(ids.into_iter().map(Into::into).collect())
    }
}
