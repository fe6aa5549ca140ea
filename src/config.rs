use crate::error::{RelayError, Result};
use crate::providers::{is_placeholder_key, BackendPreset};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_kind")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_source_language: Option<bool>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
            backend: BackendConfig::default(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: default_backend_kind(),
            base_url: None,
            model: None,
            api_key_env: None,
            require_source_language: None,
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout_secs() -> u64 {
    300
}

fn default_backend_kind() -> String {
    "openai".to_string()
}

impl RelayConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RelayError::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Search standard locations for a config file.
    /// Priority: CLI arg > CWD > XDG config > home dir > built-in defaults
    pub fn find_and_load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::load(path);
        }

        for candidate in &config_search_paths() {
            if candidate.exists() {
                tracing::info!(path = %candidate.display(), "Loading config");
                return Self::load(candidate);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Apply a `PORT`-style override. `None` leaves the port untouched.
    pub fn apply_port_override(&mut self, value: Option<&str>) -> Result<()> {
        if let Some(raw) = value {
            self.port = raw
                .trim()
                .parse()
                .map_err(|_| RelayError::config(format!("Invalid port '{raw}'")))?;
        }
        Ok(())
    }

    pub fn preset(&self) -> Result<&'static BackendPreset> {
        BackendPreset::from_name(&self.backend.kind).ok_or_else(|| {
            RelayError::config(format!(
                "Unknown backend '{}'. Known backends: {}",
                self.backend.kind,
                BackendPreset::names()
            ))
        })
    }

    /// Resolve the effective base URL (config override or preset default)
    pub fn effective_base_url(&self) -> Result<String> {
        match self.backend.base_url {
            Some(ref url) if !url.trim().is_empty() => Ok(url.trim_end_matches('/').to_string()),
            Some(_) => Err(RelayError::config("backend.base_url is empty")),
            None => Ok(self.preset()?.base_url.to_string()),
        }
    }

    pub fn effective_model(&self) -> Result<String> {
        match self.backend.model {
            Some(ref model) if !model.trim().is_empty() => Ok(model.clone()),
            Some(_) => Err(RelayError::config("backend.model is empty")),
            None => Ok(self.preset()?.default_model.to_string()),
        }
    }

    pub fn api_key_env(&self) -> Result<String> {
        match self.backend.api_key_env {
            Some(ref name) => Ok(name.trim().to_string()),
            None => Ok(self.preset()?.default_api_key_env.to_string()),
        }
    }

    pub fn requires_source_language(&self) -> Result<bool> {
        Ok(self
            .backend
            .require_source_language
            .unwrap_or(self.preset()?.requires_source_language))
    }

    /// Resolve the API key from the process environment.
    pub fn resolve_api_key(&self) -> Result<Option<String>> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    /// Resolve the API key through `lookup`. Backends that take no key yield
    /// `None`; backends that need one fail on a missing or placeholder value.
    pub fn resolve_api_key_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Option<String>> {
        let preset = self.preset()?;
        let env_name = self.api_key_env()?;

        if !preset.requires_api_key {
            return Ok(if env_name.is_empty() {
                None
            } else {
                lookup(&env_name).filter(|k| !is_placeholder_key(k))
            });
        }

        if env_name.is_empty() {
            return Err(RelayError::config(format!(
                "Backend '{}' needs an API key but backend.api_key_env is empty",
                preset.name
            )));
        }

        match lookup(&env_name) {
            None => Err(RelayError::config(format!(
                "Environment variable '{env_name}' not set. Set it with your {} API key.",
                preset.name
            ))),
            Some(key) if is_placeholder_key(&key) => Err(RelayError::config(format!(
                "Environment variable '{env_name}' still holds a placeholder value"
            ))),
            Some(key) => Ok(Some(key.trim().to_string())),
        }
    }
}

pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("translate-relay.toml")];

    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        paths.push(PathBuf::from(xdg).join("translate-relay").join("config.toml"));
    }

    if let Some(home) = home_dir() {
        paths.push(home.join(".config").join("translate-relay").join("config.toml"));
        paths.push(home.join(".translate-relay.toml"));
    }

    paths
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}
