pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::careers::handlers::handle_apply;
use crate::content::handlers as content;
use crate::estimator::handlers::handle_estimate;
use crate::inquiry::handlers::handle_contact;
use crate::state::AppState;

/// Base64 inflates the 5 MiB resume ceiling by a third, plus the JSON around it.
pub const APPLICATION_BODY_LIMIT: usize = 8 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Submissions
        .route("/api/contact", post(handle_contact))
        .route(
            "/api/careers/apply",
            post(handle_apply).layer(DefaultBodyLimit::max(APPLICATION_BODY_LIMIT)),
        )
        .route("/api/ai", post(handle_estimate))
        // Static content
        .route("/api/jobs", get(content::handle_list_jobs))
        .route("/api/jobs/:id", get(content::handle_get_job))
        .route("/api/blog", get(content::handle_list_posts))
        .route("/api/blog/:slug", get(content::handle_get_post))
        .with_state(state)
}

#[cfg(test)]
pub mod test_support {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::build_router;
    use crate::config::Config;
    use crate::llm_client::CompletionProvider;
    use crate::mailer::Mailer;
    use crate::state::AppState;

    pub fn state_with(
        mailer: Option<Arc<dyn Mailer>>,
        llm: Option<Arc<dyn CompletionProvider>>,
    ) -> AppState {
        AppState {
            config: Config::for_tests(),
            mailer,
            llm,
        }
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = build_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn post_raw(
        state: AppState,
        uri: &str,
        content_type: Option<&str>,
        body: String,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(Method::POST).uri(uri);
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }
        send(state, request.body(Body::from(body)).unwrap()).await
    }

    pub async fn post_json(state: AppState, uri: &str, json: Value) -> (StatusCode, Value) {
        post_raw(state, uri, Some("application/json"), json.to_string()).await
    }

    pub async fn get_json(state: AppState, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send(state, request).await
    }
}
