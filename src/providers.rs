//! Built-in presets for the supported model backends.
//!
//! Each preset defines where the backend lives, which model to ask for, and
//! whether it needs an API key. Users pick a backend by name in their config
//! and the preset fills in the rest.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Hosted chat-completion API.
    OpenAi,
    /// Locally served chat endpoint.
    Ollama,
}

#[derive(Debug, Clone)]
pub struct BackendPreset {
    pub name: &'static str,
    pub kind: BackendKind,
    pub base_url: &'static str,
    pub default_model: &'static str,
    /// Empty when the backend takes no key.
    pub default_api_key_env: &'static str,
    pub requires_api_key: bool,
    pub requires_source_language: bool,
}

const PRESETS: &[BackendPreset] = &[
    BackendPreset {
        name: "openai",
        kind: BackendKind::OpenAi,
        base_url: "https://api.openai.com/v1",
        default_model: "gpt-3.5-turbo",
        default_api_key_env: "OPENAI_API_KEY",
        requires_api_key: true,
        requires_source_language: false,
    },
    BackendPreset {
        name: "ollama",
        kind: BackendKind::Ollama,
        base_url: "http://localhost:11434",
        default_model: "llama3.2",
        default_api_key_env: "",
        requires_api_key: false,
        requires_source_language: true,
    },
];

/// Values shipped in sample `.env` files that must never reach a backend.
pub const PLACEHOLDER_KEYS: &[&str] = &["your_openai_api_key_here", "your_api_key_here"];

impl BackendPreset {
    #[must_use]
    pub fn from_name(name: &str) -> Option<&'static BackendPreset> {
        let name = name.to_lowercase();
        PRESETS.iter().find(|p| p.name == name)
    }

    #[must_use]
    pub fn all() -> &'static [BackendPreset] {
        PRESETS
    }

    #[must_use]
    pub fn names() -> String {
        PRESETS.iter().map(|p| p.name).collect::<Vec<_>>().join(", ")
    }
}

#[must_use]
pub fn is_placeholder_key(key: &str) -> bool {
    let key = key.trim();
    key.is_empty() || PLACEHOLDER_KEYS.contains(&key)
}
