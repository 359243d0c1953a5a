use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::{CompletionProvider, LlmClient};
use crate::mailer::{Mailer, RelayMailer};

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Collaborators are `None` when their credentials are missing; handlers that
/// need them fail closed with a configuration error.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub mailer: Option<Arc<dyn Mailer>>,
    pub llm: Option<Arc<dyn CompletionProvider>>,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let mailer = config.mail_relay_api_key.clone().map(|key| {
            Arc::new(RelayMailer::new(
                &config.mail_relay_url,
                key,
                config.mail_from.clone(),
                config.mail_timeout,
            )) as Arc<dyn Mailer>
        });
        let llm = config
            .anthropic_api_key
            .clone()
            .map(|key| Arc::new(LlmClient::new(key, config.ai_timeout)) as Arc<dyn CompletionProvider>);

        Self {
            config,
            mailer,
            llm,
        }
    }

    pub fn mailer(&self) -> Result<&dyn Mailer, AppError> {
        self.mailer
            .as_deref()
            .ok_or(AppError::Configuration("Mail relay"))
    }

    pub fn llm(&self) -> Result<&dyn CompletionProvider, AppError> {
        self.llm
            .as_deref()
            .ok_or(AppError::Configuration("AI provider"))
    }
}
