pub mod chat;
pub mod error;
pub mod password;
pub mod ui;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the full application router.
pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/", get(ui::index))
        .route("/api/ui-config", get(ui::ui_config))
        .route("/api/chat", post(chat::chat))
        .route("/api/verify-password", post(password::verify_password))
        .with_state(state)
}
