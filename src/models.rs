//! Wire shapes exchanged between the client form and the relay.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/translate`.
///
/// Every field is optional on the wire so that a missing field is reported
/// as a validation failure instead of a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,
}

impl TranslationRequest {
    pub fn new(
        text: impl Into<String>,
        source_language: Option<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            text: Some(text.into()),
            target_language: Some(target_language.into()),
            source_language,
        }
    }
}

/// Reply of `POST /api/translate`: exactly one of the two shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranslationResponse {
    Success { translation: String },
    Failure { error: String },
}

impl TranslationResponse {
    pub fn success(translation: impl Into<String>) -> Self {
        Self::Success {
            translation: translation.into(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Languages offered by the client form.
pub const LANGUAGES: &[&str] = &[
    "English",
    "Spanish",
    "French",
    "German",
    "Italian",
    "Portuguese",
    "Chinese",
    "Japanese",
    "Korean",
];

pub const DEFAULT_SOURCE_LANGUAGE: &str = "English";
pub const DEFAULT_TARGET_LANGUAGE: &str = "Spanish";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_camel_case() {
        let req: TranslationRequest = serde_json::from_str(
            r#"{"text":"Hello","targetLanguage":"Spanish","sourceLanguage":"English"}"#,
        )
        .unwrap();
        assert_eq!(req.text.as_deref(), Some("Hello"));
        assert_eq!(req.target_language.as_deref(), Some("Spanish"));
        assert_eq!(req.source_language.as_deref(), Some("English"));
    }

    #[test]
    fn test_request_tolerates_missing_fields() {
        let req: TranslationRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req, TranslationRequest::default());
    }

    #[test]
    fn test_response_shapes_are_exclusive() {
        let ok = serde_json::to_value(TranslationResponse::success("Hola")).unwrap();
        assert_eq!(ok, serde_json::json!({ "translation": "Hola" }));

        let err = serde_json::to_value(TranslationResponse::failure("boom")).unwrap();
        assert_eq!(err, serde_json::json!({ "error": "boom" }));
    }

    #[test]
    fn test_defaults_are_offered() {
        assert!(LANGUAGES.contains(&DEFAULT_SOURCE_LANGUAGE));
        assert!(LANGUAGES.contains(&DEFAULT_TARGET_LANGUAGE));
    }
}
