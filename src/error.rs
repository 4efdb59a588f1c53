use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed request field. User-correctable.
    #[error("{0}")]
    Validation(String),

    /// A categorical value has no entry in the trained encoder table.
    /// Index 0 is a real category, so silent substitution is not an option.
    #[error("unknown {field}: {value:?} has no encoder entry")]
    UnknownCategory { field: &'static str, value: String },

    /// Feature vector disagrees with the oracle's trained layout. A
    /// misconfiguration, not a user error — the artifact loader is supposed
    /// to catch this before the service starts taking requests.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Oracle or encoder artifact missing or corrupt at startup.
    #[error("artifact load error: {0}")]
    ArtifactLoad(String),

    /// Prediction call failed inside the regressor.
    #[error("model error: {0}")]
    Model(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Every per-request failure crosses the HTTP boundary as the tagged payload
/// `{"success": false, "error": ...}` — nothing propagates to the transport
/// layer uncaught.
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::UnknownCategory { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("internal error surfaced at request boundary: {self}");
        }
        let body = serde_json::json!({
            "success": false,
            "error": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
