use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Service version plus which outbound collaborators are configured.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "studio-api",
        "mail": state.mailer.is_some(),
        "ai": state.llm.is_some(),
    }))
}
