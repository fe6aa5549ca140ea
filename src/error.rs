//! Error types for the relay.

use thiserror::Error;

/// Fallback used when a failure carries no message of its own.
pub const GENERIC_FAILURE: &str = "Translation failed. Please try again.";

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RelayError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl RelayError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}

/// Request fields checked before any upstream call, in checking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Text,
    TargetLanguage,
    SourceLanguage,
}

impl Field {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Text => "Text is required and cannot be empty",
            Self::TargetLanguage => "Target language is required and cannot be empty",
            Self::SourceLanguage => "Source language is required and cannot be empty",
        }
    }
}

/// Failures raised by a model backend call.
///
/// Variants are listed in classification priority: a transport failure is
/// reported as `Network` even if a status was also observed.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream rejected credentials")]
    Unauthorized { vendor: Option<&'static str> },

    #[error("Upstream rate limit reached")]
    RateLimited,

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("Invalid response from model backend")]
    MalformedResponse { body: String },

    #[error("Empty translation received")]
    EmptyResult,

    #[error("{0}")]
    Other(String),
}

impl BackendError {
    /// Classify a transport error from the HTTP client.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_connect() {
            Self::Network(err.to_string())
        } else {
            Self::Other(format!("Request to model backend failed: {err}"))
        }
    }

    /// Classify a non-success upstream status. `message` is whatever the
    /// upstream error body said, if anything.
    pub fn from_status(status: u16, vendor: Option<&'static str>, message: String) -> Self {
        match status {
            401 => Self::Unauthorized { vendor },
            429 => Self::RateLimited,
            _ => Self::Upstream { status, message },
        }
    }

    /// HTTP status the relay answers with.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Network(_) => 503,
            Self::Unauthorized { .. } => 401,
            Self::RateLimited => 429,
            Self::Upstream { .. } | Self::MalformedResponse { .. } | Self::EmptyResult | Self::Other(_) => 500,
        }
    }

    /// Message shown to the client.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Network error. Please check your internet connection.".to_string(),
            Self::Unauthorized { vendor: Some(vendor) } => {
                format!("Invalid {vendor} API key. Please check your configuration.")
            }
            Self::Unauthorized { vendor: None } => {
                "Invalid API key. Please check your configuration.".to_string()
            }
            Self::RateLimited => "Too many requests. Please try again later.".to_string(),
            other => {
                let message = other.to_string();
                if message.trim().is_empty() {
                    GENERIC_FAILURE.to_string()
                } else {
                    message
                }
            }
        }
    }

    /// Whether this failure fell through to the catch-all bucket.
    #[must_use]
    pub fn is_unclassified(&self) -> bool {
        self.status_code() == 500
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(BackendError::Network("dns".into()).status_code(), 503);
        assert_eq!(BackendError::Unauthorized { vendor: None }.status_code(), 401);
        assert_eq!(BackendError::RateLimited.status_code(), 429);
        assert_eq!(BackendError::EmptyResult.status_code(), 500);
        assert_eq!(
            BackendError::MalformedResponse { body: "{}".into() }.status_code(),
            500
        );
    }

    #[test]
    fn test_from_status_priority() {
        assert!(matches!(
            BackendError::from_status(401, None, "nope".into()),
            BackendError::Unauthorized { .. }
        ));
        assert!(matches!(
            BackendError::from_status(429, None, String::new()),
            BackendError::RateLimited
        ));
        assert!(matches!(
            BackendError::from_status(502, None, "bad gateway".into()),
            BackendError::Upstream { status: 502, .. }
        ));
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            BackendError::Unauthorized { vendor: Some("OpenAI") }.user_message(),
            "Invalid OpenAI API key. Please check your configuration."
        );
        assert_eq!(
            BackendError::Unauthorized { vendor: None }.user_message(),
            "Invalid API key. Please check your configuration."
        );
        assert_eq!(
            BackendError::EmptyResult.user_message(),
            "Empty translation received"
        );
        assert_eq!(
            BackendError::Other("   ".into()).user_message(),
            GENERIC_FAILURE
        );
        assert_eq!(
            BackendError::Upstream {
                status: 400,
                message: "model not found".into()
            }
            .user_message(),
            "model not found"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = RelayError::config("backend.model is empty");
        assert_eq!(err.to_string(), "Configuration error: backend.model is empty");
    }

    #[test]
    fn test_field_messages() {
        assert_eq!(Field::Text.message(), "Text is required and cannot be empty");
        assert_eq!(
            Field::TargetLanguage.message(),
            "Target language is required and cannot be empty"
        );
        assert_eq!(
            Field::SourceLanguage.message(),
            "Source language is required and cannot be empty"
        );
    }
}
