use axum::extract::State;
use axum::response::Html;
use axum::Json;
use serde::Serialize;

use crate::chat::{password_notice, welcome_message, ChatMessage, LOADING_STAGES};
use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../../assets/index.html");
const COMING_SOON_HTML: &str = include_str!("../../assets/coming-soon.html");

/// Bootstrap payload for the client: feature flags plus the seed messages
/// and loading-stage strings, so the copy lives in one place.
#[derive(Debug, Serialize)]
pub struct UiConfig {
    pub coming_soon: bool,
    pub password_protected: bool,
    pub welcome: ChatMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_notice: Option<ChatMessage>,
    pub loading_stages: Vec<&'static str>,
}

/// `GET /`
pub async fn index(State(state): State<AppState>) -> Html<&'static str> {
    if state.config.coming_soon {
        Html(COMING_SOON_HTML)
    } else {
        Html(INDEX_HTML)
    }
}

/// `GET /api/ui-config`
pub async fn ui_config(State(state): State<AppState>) -> Json<UiConfig> {
    Json(UiConfig {
        coming_soon: state.config.coming_soon,
        password_protected: state.config.password_protected,
        welcome: welcome_message(),
        password_notice: if state.config.password_protected {
            Some(password_notice())
        } else {
            None
        },
        loading_stages: LOADING_STAGES.to_vec(),
    })
}
