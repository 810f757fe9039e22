use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by HTTP handlers. Pipeline failures never reach this
/// type; the orchestrator converts them to chat-renderable payloads first.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller sent an invalid or incomplete request body.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The orchestrator could not be initialized.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// An unclassified handler failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::BadRequest(m) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))).into_response()
            }
            ServerError::Unavailable(m) => {
                (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": m }))).into_response()
            }
            // The UI renders this shape as an error chat bubble.
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "type": "error", "error": m })),
                )
                    .into_response()
            }
        }
    }
}
