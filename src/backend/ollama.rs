//! Locally served backend speaking Ollama's `/api/chat` endpoint.

use super::{post_chat, single_turn, ChatMessage, ModelBackend};
use crate::error::BackendError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

pub struct OllamaBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    requires_source_language: bool,
}

impl OllamaBackend {
    /// `api_key` is only sent when the endpoint sits behind an authenticating proxy.
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            requires_source_language: true,
        }
    }

    #[must_use]
    pub fn with_source_language_required(mut self, required: bool) -> Self {
        self.requires_source_language = required;
        self
    }

    pub fn build_request(&self, system_prompt: &str, user_text: &str) -> LocalChatRequest {
        LocalChatRequest {
            model: self.model.clone(),
            messages: single_turn(system_prompt, user_text),
            stream: false,
        }
    }
}

#[async_trait]
impl ModelBackend for OllamaBackend {
    async fn complete(&self, system_prompt: &str, user_text: &str) -> Result<String, BackendError> {
        let url = format!("{}/api/chat", self.base_url.trim_end_matches('/'));
        let body = self.build_request(system_prompt, user_text);

        tracing::info!(%url, model = %body.model, "POST local chat");

        post_chat(&self.client, &url, self.api_key.as_deref(), &body, None).await
    }

    fn requires_source_language(&self) -> bool {
        self.requires_source_language
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
