use axum::{extract::State, Json};
use studio_forms::AnalysisEnvelope;
use tracing::info;

use crate::errors::AppError;
use crate::extract::AppJson;
use crate::estimator::{estimate, EstimateRequest};
use crate::state::AppState;

/// POST /api/ai
pub async fn handle_estimate(
    State(state): State<AppState>,
    AppJson(request): AppJson<EstimateRequest>,
) -> Result<Json<AnalysisEnvelope>, AppError> {
    let idea = request.idea()?;
    let llm = state.llm()?;

    let data = estimate(llm, idea).await?;
    info!(
        score = data.complexity.score,
        weeks = data.timeline.weeks,
        "estimate produced"
    );
    Ok(Json(AnalysisEnvelope { success: true, data }))
}
