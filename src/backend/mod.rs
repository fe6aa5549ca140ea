//! Model backends the relay forwards translation prompts to.
//!
//! A backend turns one system instruction plus one user message into one
//! completion string. The concrete variant is picked from configuration at
//! startup and handed to the router as a trait object, so tests can swap in
//! their own.

pub mod envelope;
pub mod ollama;
pub mod openai;

use crate::config::RelayConfig;
use crate::error::{BackendError, Result};
use crate::providers::BackendKind;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use ollama::OllamaBackend;
pub use openai::OpenAiBackend;

#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Run one non-streaming, single-turn completion and return the raw reply.
    async fn complete(
        &self,
        system_prompt: &str,
        user_text: &str,
    ) -> std::result::Result<String, BackendError>;

    /// Whether requests must name their source language.
    fn requires_source_language(&self) -> bool;

    fn name(&self) -> &str;
}

/// One `{role, content}` entry of a chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// The two-message conversation every backend receives.
#[must_use]
pub fn single_turn(system_prompt: &str, user_text: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::system(system_prompt), ChatMessage::user(user_text)]
}

/// Build the backend selected by `config`.
///
/// Fails when the backend's required settings are missing; callers treat
/// that as fatal at startup.
pub fn from_config(config: &RelayConfig, client: reqwest::Client) -> Result<Arc<dyn ModelBackend>> {
    let preset = config.preset()?;
    let base_url = config.effective_base_url()?;
    let model = config.effective_model()?;
    let api_key = config.resolve_api_key()?;
    let requires_source = config.requires_source_language()?;

    let backend: Arc<dyn ModelBackend> = match preset.kind {
        BackendKind::OpenAi => {
            let api_key = api_key.ok_or_else(|| {
                crate::error::RelayError::config("OpenAI backend requires an API key")
            })?;
            Arc::new(
                OpenAiBackend::new(client, base_url, model, api_key)
                    .with_source_language_required(requires_source),
            )
        }
        BackendKind::Ollama => Arc::new(
            OllamaBackend::new(client, base_url, model, api_key)
                .with_source_language_required(requires_source),
        ),
    };

    tracing::info!(backend = backend.name(), "Model backend ready");
    Ok(backend)
}

/// POST `body` to `url` and return the reply text from whichever envelope
/// the backend answered with.
pub(crate) async fn post_chat<B: Serialize + ?Sized>(
    client: &reqwest::Client,
    url: &str,
    bearer: Option<&str>,
    body: &B,
    vendor: Option<&'static str>,
) -> std::result::Result<String, BackendError> {
    let mut request = client
        .post(url)
        .header("Content-Type", "application/json")
        .json(body);
    if let Some(key) = bearer {
        request = request.header("Authorization", format!("Bearer {key}"));
    }

    let response = request
        .send()
        .await
        .map_err(|e| BackendError::from_transport(&e))?;

    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| BackendError::Other(format!("Failed to read model backend response: {e}")))?;

    tracing::debug!(url, status, body_len = text.len(), "Model backend replied");

    if status >= 400 {
        let message = envelope::extract_error_message(&text)
            .unwrap_or_else(|| format!("Model backend returned status {status}"));
        return Err(BackendError::from_status(status, vendor, message));
    }

    envelope::extract_reply(&text)
}
