//! Stats command handler.

use clap::Args;
use mathtutor_core::{AppConfig, AppResult};

/// Show knowledge base statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let stats = mathtutor_knowledge::ingest::stats(&config.index_path())?;

        if self.json {
            let output = serde_json::json!({
                "documentsCount": stats.documents_count,
                "chunksCount": stats.chunks_count,
                "dbSizeBytes": stats.db_size_bytes,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Knowledge base: {:?}", config.index_path());
            println!("  Documents: {}", stats.documents_count);
            println!("  Chunks: {}", stats.chunks_count);
            println!("  DB size: {} bytes", stats.db_size_bytes);
        }

        Ok(())
    }
}
