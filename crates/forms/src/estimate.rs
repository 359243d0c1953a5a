//! The AI project-estimate contract.
//!
//! CRITICAL: callers never see a shape that deviates from this contract.
//! Provider output is coerced (arrays truncated to 4, score clamped into
//! [1, 10]); anything absent or of the wrong type is a `ShapeError`. There is
//! no partial substitution of placeholder data.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::submission::ResponseShape;

pub const LIST_LEN: usize = 4;
pub const PHASE_COUNT: usize = 4;
pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub tech_stack: Vec<String>,
    pub complexity: Complexity,
    pub features: Vec<String>,
    pub timeline: TimelinePlan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complexity {
    pub score: u8,
    pub level: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePlan {
    pub weeks: u32,
    pub phases: Vec<PhasePlan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhasePlan {
    pub title: String,
    pub weeks: u32,
    pub status: String,
}

/// `{ success: true, data: Analysis }` as returned by `/api/ai`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisEnvelope {
    pub success: bool,
    pub data: Analysis,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("malformed analysis at '{path}': {reason}")]
pub struct ShapeError {
    pub path: String,
    pub reason: String,
}

impl ShapeError {
    fn new(path: &str, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

impl Analysis {
    /// Verifies the exact contract on an already-typed value.
    pub fn check(&self) -> Result<(), ShapeError> {
        check_list("techStack", &self.tech_stack)?;
        check_list("features", &self.features)?;
        if !(MIN_SCORE..=MAX_SCORE).contains(&self.complexity.score) {
            return Err(ShapeError::new("complexity.score", "out of range 1-10"));
        }
        if self.complexity.level.trim().is_empty() {
            return Err(ShapeError::new("complexity.level", "empty"));
        }
        if self.timeline.phases.len() != PHASE_COUNT {
            return Err(ShapeError::new(
                "timeline.phases",
                format!("expected {PHASE_COUNT} phases, got {}", self.timeline.phases.len()),
            ));
        }
        Ok(())
    }
}

impl ResponseShape for AnalysisEnvelope {
    fn check(&self) -> Result<(), String> {
        if !self.success {
            return Err("provider reported failure".to_string());
        }
        self.data.check().map_err(|e| e.to_string())
    }
}

fn check_list(path: &str, items: &[String]) -> Result<(), ShapeError> {
    if items.len() != LIST_LEN {
        return Err(ShapeError::new(
            path,
            format!("expected {LIST_LEN} items, got {}", items.len()),
        ));
    }
    if items.iter().any(|s| s.trim().is_empty()) {
        return Err(ShapeError::new(path, "contains an empty item"));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Coercion of raw provider output
// ────────────────────────────────────────────────────────────────────────────

/// Coerces raw provider JSON into the contract or fails as a whole.
pub fn coerce(value: &Value) -> Result<Analysis, ShapeError> {
    let complexity = value
        .get("complexity")
        .ok_or_else(|| ShapeError::new("complexity", "missing"))?;
    let timeline = value
        .get("timeline")
        .ok_or_else(|| ShapeError::new("timeline", "missing"))?;

    let score = number(complexity.get("score"), "complexity.score")?;
    let score = score.round().clamp(MIN_SCORE as f64, MAX_SCORE as f64) as u8;

    let phases = timeline
        .get("phases")
        .and_then(Value::as_array)
        .ok_or_else(|| ShapeError::new("timeline.phases", "missing or not an array"))?;
    if phases.len() < PHASE_COUNT {
        return Err(ShapeError::new(
            "timeline.phases",
            format!("expected {PHASE_COUNT} phases, got {}", phases.len()),
        ));
    }
    let phases = phases
        .iter()
        .take(PHASE_COUNT)
        .enumerate()
        .map(|(i, p)| {
            Ok(PhasePlan {
                title: string(p.get("title"), &format!("timeline.phases[{i}].title"))?,
                weeks: count(p.get("weeks"), &format!("timeline.phases[{i}].weeks"))?,
                status: string(p.get("status"), &format!("timeline.phases[{i}].status"))?,
            })
        })
        .collect::<Result<Vec<_>, ShapeError>>()?;

    let analysis = Analysis {
        tech_stack: string_list(value.get("techStack"), "techStack")?,
        complexity: Complexity {
            score,
            level: string(complexity.get("level"), "complexity.level")?,
            description: string(complexity.get("description"), "complexity.description")?,
        },
        features: string_list(value.get("features"), "features")?,
        timeline: TimelinePlan {
            weeks: count(timeline.get("weeks"), "timeline.weeks")?,
            phases,
        },
    };
    analysis.check()?;
    Ok(analysis)
}

fn number(value: Option<&Value>, path: &str) -> Result<f64, ShapeError> {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match n {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(ShapeError::new(path, "expected a number")),
    }
}

fn count(value: Option<&Value>, path: &str) -> Result<u32, ShapeError> {
    let n = number(value, path)?;
    if n < 0.0 {
        return Err(ShapeError::new(path, "negative"));
    }
    Ok(n.round().min(u32::MAX as f64) as u32)
}

fn string(value: Option<&Value>, path: &str) -> Result<String, ShapeError> {
    match value.and_then(Value::as_str).map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(ShapeError::new(path, "expected a non-empty string")),
    }
}

fn string_list(value: Option<&Value>, path: &str) -> Result<Vec<String>, ShapeError> {
    let items = value
        .and_then(Value::as_array)
        .ok_or_else(|| ShapeError::new(path, "missing or not an array"))?;
    items
        .iter()
        .take(LIST_LEN)
        .enumerate()
        .map(|(i, v)| string(Some(v), &format!("{path}[{i}]")))
        .collect()
}
