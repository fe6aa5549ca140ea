//! Client side of the relay: the translation form's state machine and the
//! HTTP call it makes. The page served at `/` runs the same rules in the
//! browser.

use crate::models::{TranslationRequest, DEFAULT_SOURCE_LANGUAGE, DEFAULT_TARGET_LANGUAGE};
use serde_json::Value;

pub const FALLBACK_FAILURE: &str = "Translation failed. Please try again.";
pub const NO_TRANSLATION: &str = "No translation received. Please try again.";
pub const UNEXPECTED_FAILURE: &str = "An unexpected error occurred. Please try again.";

/// What the form shows. Exactly one panel at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormView {
    #[default]
    Empty,
    Loading,
    Error(String),
    Translation(String),
}

/// Raw result of one exchange with the relay, before interpretation.
#[derive(Debug, Clone)]
pub enum Exchange {
    /// The relay answered. `body` is `None` when it was not JSON.
    Answered { status: u16, body: Option<Value> },
    /// The request never produced an answer.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct TranslationForm {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
    in_flight: bool,
    view: FormView,
}

impl Default for TranslationForm {
    fn default() -> Self {
        Self {
            text: String::new(),
            source_language: DEFAULT_SOURCE_LANGUAGE.to_string(),
            target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            in_flight: false,
            view: FormView::Empty,
        }
    }
}

impl TranslationForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.in_flight && !self.text.trim().is_empty()
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    #[must_use]
    pub fn view(&self) -> &FormView {
        &self.view
    }

    /// Start a submission. Returns the body to send, or `None` when the
    /// submit action is disabled.
    pub fn begin_submit(&mut self) -> Option<TranslationRequest> {
        if !self.can_submit() {
            return None;
        }
        self.in_flight = true;
        self.view = FormView::Loading;
        Some(TranslationRequest::new(
            self.text.clone(),
            Some(self.source_language.clone()),
            self.target_language.clone(),
        ))
    }

    /// Finish a submission. This is the only place the in-flight flag clears,
    /// and every failure shown to the user is logged here.
    pub fn finish(&mut self, exchange: Exchange) {
        self.view = match interpret(exchange) {
            Ok(translation) => FormView::Translation(translation),
            Err(message) => {
                tracing::error!("Translation failed: {}", message);
                FormView::Error(message)
            }
        };
        self.in_flight = false;
    }
}

/// Turn a relay exchange into the translation or the message to show.
pub fn interpret(exchange: Exchange) -> Result<String, String> {
    let (status, body) = match exchange {
        Exchange::Failed(message) if message.trim().is_empty() => {
            return Err(UNEXPECTED_FAILURE.to_string())
        }
        Exchange::Failed(message) => return Err(message),
        Exchange::Answered { status, body } => (status, body),
    };

    let field = |name: &str| {
        body.as_ref()
            .and_then(|b| b.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    if !(200..300).contains(&status) {
        return Err(field("error")
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| FALLBACK_FAILURE.to_string()));
    }

    if body.is_none() {
        return Err(UNEXPECTED_FAILURE.to_string());
    }

    field("translation")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| NO_TRANSLATION.to_string())
}

/// Thin HTTP client for `POST /api/translate`.
#[derive(Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    endpoint: String,
}

impl RelayClient {
    pub fn new(http: reqwest::Client, relay_url: &str) -> Self {
        Self {
            http,
            endpoint: format!("{}/api/translate", relay_url.trim_end_matches('/')),
        }
    }

    pub async fn send(&self, request: &TranslationRequest) -> Exchange {
        let response = match self.http.post(&self.endpoint).json(request).send().await {
            Ok(r) => r,
            Err(e) => return Exchange::Failed(e.to_string()),
        };
        let status = response.status().as_u16();
        let body = response.json::<Value>().await.ok();
        Exchange::Answered { status, body }
    }

    /// Run one submission of `form`. Does nothing if submitting is disabled.
    pub async fn submit(&self, form: &mut TranslationForm) {
        let Some(request) = form.begin_submit() else {
            return;
        };
        let exchange = self.send(&request).await;
        form.finish(exchange);
    }
}
