// AI project estimator: one prompt in, one validated Analysis out.

pub mod handlers;
pub mod prompts;

use serde::Deserialize;
use studio_forms::estimate::{coerce, Analysis};

use crate::errors::AppError;
use crate::llm_client::CompletionProvider;

/// Longest project description forwarded to the provider.
pub const MAX_PROMPT_CHARS: usize = 4_000;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EstimateRequest {
    #[serde(default)]
    pub prompt: String,
}

impl EstimateRequest {
    pub fn idea(&self) -> Result<&str, AppError> {
        let idea = self.prompt.trim();
        if idea.is_empty() {
            return Err(AppError::Validation(
                "Please describe your project idea".to_string(),
            ));
        }
        if idea.chars().count() > MAX_PROMPT_CHARS {
            return Err(AppError::Validation(format!(
                "Please keep the description under {MAX_PROMPT_CHARS} characters"
            )));
        }
        Ok(idea)
    }
}

/// Asks the provider for an estimate and holds its answer to the contract.
///
/// CRITICAL: unusable provider output is an error, never a partially filled
/// analysis.
pub async fn estimate(llm: &dyn CompletionProvider, idea: &str) -> Result<Analysis, AppError> {
    let raw = llm
        .complete_json(&prompts::estimate_prompt(idea), &prompts::system_prompt())
        .await
        .map_err(|e| {
            if e.is_malformed() {
                AppError::MalformedUpstream(e.to_string())
            } else {
                AppError::Llm(e)
            }
        })?;

    coerce(&raw).map_err(|e| AppError::MalformedUpstream(e.to_string()))
}


#[cfg(test)]
mod tests {
    use super::testing::{well_formed, CannedProvider};
    use super::*;
    use crate::llm_client::LlmError;

    #[test]
    fn test_blank_prompt_rejected() {
        let req = EstimateRequest { prompt: "   ".to_string() };
        assert!(matches!(req.idea(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_overlong_prompt_rejected() {
        let req = EstimateRequest { prompt: "x".repeat(MAX_PROMPT_CHARS + 1) };
        assert!(matches!(req.idea(), Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_estimate_clamps_score() {
        let mut raw = well_formed();
        raw["complexity"]["score"] = serde_json::json!(15);
        let llm = CannedProvider::replying(Ok(raw));

        let analysis = estimate(&llm, "A marketplace for plants").await.unwrap();
        assert_eq!(analysis.complexity.score, 10);
        assert!(llm.prompts.lock().unwrap()[0].contains("A marketplace for plants"));
    }

    #[tokio::test]
    async fn test_short_feature_list_is_malformed() {
        let mut raw = well_formed();
        raw["features"] = serde_json::json!(["Auth"]);
        let err = estimate(&CannedProvider::replying(Ok(raw)), "idea").await.unwrap_err();
        assert!(matches!(err, AppError::MalformedUpstream(_)));
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_malformed() {
        let err = estimate(&CannedProvider::replying(Err(LlmError::EmptyContent)), "idea")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MalformedUpstream(_)));
    }

    #[tokio::test]
    async fn test_provider_failure_is_llm_error() {
        let reply = Err(LlmError::Exhausted { attempts: 2 });
        let err = estimate(&CannedProvider::replying(reply), "idea").await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }
}
