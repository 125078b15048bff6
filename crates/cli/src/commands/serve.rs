//! HTTP server command.

use clap::Args;
use mathtutor_core::{AppConfig, AppError, AppResult};
use mathtutor_server::TutorServer;

/// Run the HTTP server
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let agent = super::build_agent(config)?;

        let bind = self.bind.as_deref().unwrap_or(&config.bind);
        let server = TutorServer::new(bind, agent);

        server
            .run()
            .await
            .map_err(|e| AppError::Other(format!("Server error: {}", e)))
    }
}
