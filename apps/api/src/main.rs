mod careers;
mod config;
mod content;
mod errors;
mod estimator;
mod extract;
mod inquiry;
mod llm_client;
mod mailer;
mod routes;
mod state;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{crate_name}={level},studio_forms={level},tower_http={level}",
                crate_name = env!("CARGO_CRATE_NAME"),
                level = &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Studio API v{}", env!("CARGO_PKG_VERSION"));

    let cors = cors_layer(&config)?;
    let state = AppState::from_config(config.clone());

    match &state.mailer {
        Some(_) => info!("Mail relay configured ({})", config.mail_relay_url),
        None => warn!("MAIL_RELAY_API_KEY not set; contact and careers forms will fail closed"),
    }
    match &state.llm {
        Some(_) => info!("LLM client initialized (model: {})", llm_client::MODEL),
        None => warn!("ANTHROPIC_API_KEY not set; the estimator will fail closed"),
    }

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Permissive unless `CORS_ORIGIN` pins a single origin.
fn cors_layer(config: &Config) -> Result<CorsLayer> {
    let Some(origin) = &config.cors_origin else {
        return Ok(CorsLayer::permissive());
    };
    let origin: HeaderValue = origin
        .parse()
        .with_context(|| format!("CORS_ORIGIN is not a valid origin: {origin}"))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
