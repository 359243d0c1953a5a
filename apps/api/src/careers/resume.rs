//! Resume attachment decoding.
//!
//! The browser sends the file as base64, sometimes still wearing its
//! `data:<mime>;base64,` header. The header is stripped, the payload decoded
//! to prove it is real base64, and the size checked against the same ceiling
//! the client enforces.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use studio_forms::MAX_ATTACHMENT_BYTES;

use crate::errors::AppError;
use crate::mailer::EmailAttachment;

const FALLBACK_NAME: &str = "resume";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedResume {
    pub file_name: String,
    pub content: Bytes,
}

impl DecodedResume {
    pub fn to_attachment(&self) -> EmailAttachment {
        EmailAttachment {
            filename: self.file_name.clone(),
            content: STANDARD.encode(&self.content),
        }
    }
}

/// Removes a leading `data:...;base64,` header if present.
pub fn strip_data_uri(raw: &str) -> &str {
    let raw = raw.trim();
    match raw.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, payload)| payload).unwrap_or(""),
        None => raw,
    }
}

/// Keeps only the last path component and drops control characters.
pub fn sanitize_file_name(name: Option<&str>) -> String {
    let base = name
        .unwrap_or_default()
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    let cleaned: String = base.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Decodes an optional resume. An absent or blank file is `Ok(None)`.
pub fn decode_resume(file: Option<&str>, file_name: Option<&str>) -> Result<Option<DecodedResume>, AppError> {
    let Some(raw) = file.filter(|f| !f.trim().is_empty()) else {
        return Ok(None);
    };

    let payload: String = strip_data_uri(raw)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    // base64 expands 3 bytes into 4 chars; reject before decoding when clearly oversized
    let estimated = (payload.len() as u64 / 4) * 3;
    if estimated > MAX_ATTACHMENT_BYTES + 2 {
        return Err(too_large());
    }

    let content = STANDARD
        .decode(payload.as_bytes())
        .map_err(|_| AppError::Validation("Resume file could not be decoded".to_string()))?;
    if content.len() as u64 > MAX_ATTACHMENT_BYTES {
        return Err(too_large());
    }
    if content.is_empty() {
        return Err(AppError::Validation("Resume file is empty".to_string()));
    }

    Ok(Some(DecodedResume {
        file_name: sanitize_file_name(file_name),
        content: Bytes::from(content),
    }))
}

fn too_large() -> AppError {
    AppError::PayloadTooLarge("Resume must be 5MB or smaller".to_string())
}
