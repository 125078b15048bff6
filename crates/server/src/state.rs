use std::sync::Arc;

use mathtutor_agent::MathAgent;

/// Shared application state for axum handlers.
pub struct AppState {
    pub agent: Arc<MathAgent>,
}
