//! Hosted backend speaking the [OpenAI Chat Completions API](https://platform.openai.com/docs/api-reference/chat).

use super::{post_chat, single_turn, ChatMessage, ModelBackend};
use crate::error::BackendError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

pub struct OpenAiBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    requires_source_language: bool,
}

impl OpenAiBackend {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
            requires_source_language: false,
        }
    }

    #[must_use]
    pub fn with_source_language_required(mut self, required: bool) -> Self {
        self.requires_source_language = required;
        self
    }

    pub fn build_request(&self, system_prompt: &str, user_text: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: single_turn(system_prompt, user_text),
            stream: false,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ModelBackend for OpenAiBackend {
    async fn complete(&self, system_prompt: &str, user_text: &str) -> Result<String, BackendError> {
        let url = self.endpoint();
        let body = self.build_request(system_prompt, user_text);

        tracing::info!(%url, model = %body.model, "POST chat completion");

        post_chat(&self.client, &url, Some(&self.api_key), &body, Some("OpenAI")).await
    }

    fn requires_source_language(&self) -> bool {
        self.requires_source_language
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn backend_for(server: &MockServer) -> OpenAiBackend {
        OpenAiBackend::new(reqwest::Client::new(), server.url("/v1"), "gpt-3.5-turbo", "sk-test")
    }

    #[test]
    fn test_request_is_single_turn_non_streaming() {
        let backend = OpenAiBackend::new(reqwest::Client::new(), "http://x/v1", "gpt-4o-mini", "k");
        let req = backend.build_request("system text", "Hello \"world\"");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "Hello \"world\"");
    }

    #[tokio::test]
    async fn test_complete_returns_reply() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .header("Authorization", "Bearer sk-test")
                    .json_body_partial(r#"{"model":"gpt-3.5-turbo","stream":false}"#);
                then.status(200).json_body(serde_json::json!({
                    "id": "chatcmpl-1",
                    "object": "chat.completion",
                    "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hola"}}]
                }));
            })
            .await;

        let reply = backend_for(&server).complete("sys", "Hello").await.unwrap();
        assert_eq!(reply, "Hola");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_names_openai() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(401).json_body(serde_json::json!({
                    "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
                }));
            })
            .await;

        let err = backend_for(&server).complete("sys", "Hello").await.unwrap_err();
        assert_eq!(err.status_code(), 401);
        assert!(err.user_message().contains("Invalid OpenAI API key"));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(429).body("slow down");
            })
            .await;

        let err = backend_for(&server).complete("sys", "Hello").await.unwrap_err();
        assert!(matches!(err, BackendError::RateLimited));
    }

    #[tokio::test]
    async fn test_other_status_keeps_upstream_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(404).json_body(serde_json::json!({
                    "error": {"message": "The model `gpt-9` does not exist"}
                }));
            })
            .await;

        let err = backend_for(&server).complete("sys", "Hello").await.unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.user_message(), "The model `gpt-9` does not exist");
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = OpenAiBackend::new(
            reqwest::Client::new(),
            format!("http://{addr}/v1"),
            "gpt-3.5-turbo",
            "sk-test",
        );
        let err = backend.complete("sys", "Hello").await.unwrap_err();
        assert_eq!(err.status_code(), 503);
    }
}
