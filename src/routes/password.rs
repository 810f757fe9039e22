use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `POST /api/verify-password`
///
/// Compares the submitted password against the configured jury secret.
/// With no secret configured the gate never unlocks.
pub async fn verify_password(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "error verifying password");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(VerifyResponse {
                    success: false,
                    message: Some(
                        "An error occurred while verifying the password".to_string(),
                    ),
                }),
            )
                .into_response();
        }
    };

    let matches = match (&state.config.jury_password, &request.password) {
        (Some(expected), Some(given)) => expected == given,
        _ => false,
    };

    if matches {
        Json(VerifyResponse {
            success: true,
            message: None,
        })
        .into_response()
    } else {
        Json(VerifyResponse {
            success: false,
            message: Some("Incorrect password".to_string()),
        })
        .into_response()
    }
}
