use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::routes::error::ServerError;
use crate::service::QueryOutcome;
use crate::state::AppState;

pub const UNAVAILABLE_MESSAGE: &str = "AI service is not available. Please try again later.";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "sessionId")]
    pub session_id: Option<String>,
}

/// Chat endpoint response. Orchestrator failures arrive as `Error` with
/// HTTP 200 so the UI can render them as a chat bubble.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChatResponse {
    Result { content: String },
    Error { error: String },
}

/// `POST /api/chat`
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ServerError> {
    let Json(request) = payload
        .map_err(|_| ServerError::BadRequest("Message is required".to_string()))?;

    let message = match request.message {
        Some(m) if !m.trim().is_empty() => m,
        _ => {
            warn!("request missing required message field");
            return Err(ServerError::BadRequest("Message is required".to_string()));
        }
    };

    if !state.service.ensure_ready().await {
        return Err(ServerError::Unavailable(UNAVAILABLE_MESSAGE.to_string()));
    }

    let session_id = request.session_id.as_deref();
    info!(session_id = session_id.unwrap_or("N/A"), "processing message");

    match state.service.process_query(&message, session_id).await {
        QueryOutcome::Answer(content) => {
            info!("successfully processed message");
            Ok(Json(ChatResponse::Result { content }))
        }
        QueryOutcome::Error(error) => {
            warn!(error = %error, "error from disruption service");
            Ok(Json(ChatResponse::Error { error }))
        }
    }
}
