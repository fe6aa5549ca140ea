use crate::backend::ModelBackend;
use crate::logging::DiagnosticLog;
use crate::models::{
    TranslationRequest, TranslationResponse, DEFAULT_SOURCE_LANGUAGE, DEFAULT_TARGET_LANGUAGE,
    LANGUAGES,
};
use crate::relay;

use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

const FORM_TEMPLATE: &str = include_str!("../assets/index.html");

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn ModelBackend>,
    pub log: DiagnosticLog,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_form))
        .route("/api/translate", post(handle_translate))
        .route("/api/languages", get(handle_languages))
        .route("/health", get(handle_health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_translate(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Response {
    // Oversized or unreadable bodies still get the `{error}` shape.
    let body = match body {
        Ok(b) => b,
        Err(rejection) => {
            let reason = rejection.body_text();
            state.log.warn(
                "server",
                Uuid::new_v4(),
                format!("Failed to read request body: {}", reason),
            );
            let err = TranslationResponse::failure(format!("Invalid request body: {}", reason));
            return (StatusCode::BAD_REQUEST, Json(err)).into_response();
        }
    };

    let req: TranslationRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            state.log.warn(
                "server",
                Uuid::new_v4(),
                format!("Failed to parse request: {}", e),
            );
            let err = TranslationResponse::failure(format!("Invalid request body: {}", e));
            return (StatusCode::BAD_REQUEST, Json(err)).into_response();
        }
    };

    let outcome = relay::translate(&req, state.backend.as_ref(), &state.log).await;
    let status = StatusCode::from_u16(outcome.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(outcome.body)).into_response()
}

async fn handle_form() -> Html<String> {
    Html(render_form_page())
}

/// The client form with the language lists filled in.
#[must_use]
pub fn render_form_page() -> String {
    let options: String = LANGUAGES
        .iter()
        .map(|lang| format!("<option>{lang}</option>"))
        .collect();

    FORM_TEMPLATE
        .replace("{{LANGUAGE_OPTIONS}}", &options)
        .replace("{{DEFAULT_SOURCE}}", DEFAULT_SOURCE_LANGUAGE)
        .replace("{{DEFAULT_TARGET}}", DEFAULT_TARGET_LANGUAGE)
}

async fn handle_languages() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "languages": LANGUAGES }))
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "backend": state.backend.name(),
    }))
}
