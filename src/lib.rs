pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod providers;
pub mod relay;
pub mod server;

pub use backend::ModelBackend;
pub use config::RelayConfig;
pub use error::{BackendError, RelayError, Result};
pub use logging::DiagnosticLog;
pub use models::{TranslationRequest, TranslationResponse};
pub use server::{build_router, AppState};
