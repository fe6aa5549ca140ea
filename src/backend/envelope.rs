//! Reply envelopes accepted from model backends.
//!
//! Hosted chat-completion APIs answer with `choices[0].message.content`,
//! a local chat endpoint with `message.content`, and a local generate
//! endpoint with `response`. Any of the three is accepted from any backend.

use crate::error::BackendError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReplyEnvelope {
    ChatCompletion { choices: Vec<Choice> },
    LocalChat { message: ReplyMessage },
    LocalGenerate { response: String },
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorEnvelope {
    Detailed { error: ErrorDetail },
    Plain { error: String },
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Pull the completion text out of a success body. The text is returned as
/// sent; trimming and emptiness checks belong to the caller.
pub fn extract_reply(body: &str) -> Result<String, BackendError> {
    let malformed = || BackendError::MalformedResponse {
        body: truncate(body, 300).to_string(),
    };

    let envelope: ReplyEnvelope = serde_json::from_str(body).map_err(|_| malformed())?;

    let content = match envelope {
        ReplyEnvelope::ChatCompletion { choices } => {
            choices.into_iter().next().and_then(|c| c.message.content)
        }
        ReplyEnvelope::LocalChat { message } => message.content,
        ReplyEnvelope::LocalGenerate { response } => Some(response),
    };

    content.ok_or_else(malformed)
}

/// Pull a human-readable message out of an error body, if it has one.
#[must_use]
pub fn extract_error_message(body: &str) -> Option<String> {
    let message = match serde_json::from_str::<ErrorEnvelope>(body).ok()? {
        ErrorEnvelope::Detailed { error } => error.message,
        ErrorEnvelope::Plain { error } => error,
    };
    (!message.trim().is_empty()).then_some(message)
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_completion_envelope() {
        let body = r#"{"id":"chatcmpl-1","object":"chat.completion","choices":[{"index":0,"message":{"role":"assistant","content":"Hola"},"finish_reason":"stop"}]}"#;
        assert_eq!(extract_reply(body).unwrap(), "Hola");
    }

    #[test]
    fn test_local_chat_envelope() {
        let body = r#"{"model":"llama3.2","message":{"role":"assistant","content":" Bonjour \n"},"done":true}"#;
        assert_eq!(extract_reply(body).unwrap(), " Bonjour \n");
    }

    #[test]
    fn test_local_generate_envelope() {
        let body = r#"{"model":"llama3.2","response":"Hallo","done":true}"#;
        assert_eq!(extract_reply(body).unwrap(), "Hallo");
    }

    #[test]
    fn test_empty_content_is_not_malformed() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":""}}]}"#;
        assert_eq!(extract_reply(body).unwrap(), "");
    }

    #[test]
    fn test_missing_content_is_malformed() {
        for body in [
            r#"{"choices":[]}"#,
            r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#,
            r#"{"unexpected":true}"#,
            "not json",
        ] {
            assert!(
                matches!(extract_reply(body), Err(BackendError::MalformedResponse { .. })),
                "body {body} should be malformed"
            );
        }
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            extract_error_message(r#"{"error":{"message":"model not found","type":"invalid_request_error"}}"#)
                .as_deref(),
            Some("model not found")
        );
        assert_eq!(
            extract_error_message(r#"{"error":"model 'x' not found"}"#).as_deref(),
            Some("model 'x' not found")
        );
        assert_eq!(extract_error_message("<html>502</html>"), None);
        assert_eq!(extract_error_message(r#"{"error":""}"#), None);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "h");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
