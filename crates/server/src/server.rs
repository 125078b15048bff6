use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use mathtutor_agent::MathAgent;

use crate::routes;
use crate::state::AppState;

/// HTTP server wrapping the tutoring agent, built on axum.
pub struct TutorServer {
    bind: String,
    agent: Arc<MathAgent>,
}

impl TutorServer {
    pub fn new(bind: impl Into<String>, agent: Arc<MathAgent>) -> Self {
        Self {
            bind: bind.into(),
            agent,
        }
    }

    /// Build the router (separate from `run` so tests can drive it directly).
    pub fn router(&self) -> Router {
        let state = Arc::new(AppState {
            agent: self.agent.clone(),
        });

        Router::new()
            .route("/health", get(routes::health))
            .route("/ask", post(routes::ask))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Run the server until the process is stopped.
    pub async fn run(&self) -> anyhow::Result<()> {
        let app = self.router();

        let listener = TcpListener::bind(&self.bind).await?;
        info!(bind = %self.bind, "Tutor server listening");

        axum::serve(listener, app).await?;
        Ok(())
    }
}
