use std::sync::Arc;

use crate::config::Config;
use crate::service::QueryService;

/// State shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// The query orchestrator, injected so tests can stub it.
    pub service: Arc<dyn QueryService>,
}
