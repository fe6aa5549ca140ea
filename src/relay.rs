use crate::backend::ModelBackend;
use crate::error::{BackendError, Field};
use crate::logging::DiagnosticLog;
use crate::models::{TranslationRequest, TranslationResponse};

use uuid::Uuid;

/// A request whose required fields are present and non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    /// Sent to the model exactly as the client typed it.
    pub text: String,
    pub target_language: String,
    pub source_language: Option<String>,
}

/// Outcome of relaying one request: the status to answer with and the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayOutcome {
    pub status: u16,
    pub body: TranslationResponse,
}

impl RelayOutcome {
    fn success(translation: String) -> Self {
        Self {
            status: 200,
            body: TranslationResponse::success(translation),
        }
    }

    fn failure(status: u16, error: impl Into<String>) -> Self {
        Self {
            status,
            body: TranslationResponse::failure(error),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Check fields in order and stop at the first missing one.
pub fn validate(
    req: &TranslationRequest,
    requires_source_language: bool,
) -> Result<ValidatedRequest, Field> {
    let text = match req.text.as_deref() {
        Some(t) if !t.trim().is_empty() => t.to_string(),
        _ => return Err(Field::Text),
    };

    let target_language = non_blank(req.target_language.as_deref())
        .ok_or(Field::TargetLanguage)?
        .to_string();

    let source_language = non_blank(req.source_language.as_deref()).map(str::to_string);
    if requires_source_language && source_language.is_none() {
        return Err(Field::SourceLanguage);
    }

    Ok(ValidatedRequest {
        text,
        target_language,
        source_language,
    })
}

/// System instruction for a validated request.
#[must_use]
pub fn system_prompt(req: &ValidatedRequest) -> String {
    let direction = match req.source_language {
        Some(ref source) => format!("from {} to {}", source, req.target_language),
        None => format!("to {}", req.target_language),
    };
    format!(
        "You are a professional translator. Translate the following text {direction}. \
         Only respond with the translation, nothing else."
    )
}

/// Validate, call the backend once, and normalize the result.
pub async fn translate(
    req: &TranslationRequest,
    backend: &dyn ModelBackend,
    log: &DiagnosticLog,
) -> RelayOutcome {
    let request_id = Uuid::new_v4();

    let validated = match validate(req, backend.requires_source_language()) {
        Ok(v) => v,
        Err(field) => {
            log.warn("relay", request_id, format!("Rejected request: {}", field.message()));
            return RelayOutcome::failure(400, field.message());
        }
    };

    log.info(
        "relay",
        request_id,
        format!(
            "Translating {} chars {} -> {} via {}",
            validated.text.chars().count(),
            validated.source_language.as_deref().unwrap_or("auto"),
            validated.target_language,
            backend.name()
        ),
    );

    let prompt = system_prompt(&validated);
    let result = backend
        .complete(&prompt, &validated.text)
        .await
        .and_then(|reply| {
            let translation = reply.trim();
            if translation.is_empty() {
                Err(BackendError::EmptyResult)
            } else {
                Ok(translation.to_string())
            }
        });

    match result {
        Ok(translation) => RelayOutcome::success(translation),
        Err(err) => {
            let message = err.user_message();
            let detail = err.is_unclassified().then(|| format!("{err:?}"));
            log.error(
                "relay",
                request_id,
                format!("Translation error: {err}"),
                detail,
            );
            RelayOutcome::failure(err.status_code(), message)
        }
    }
}
