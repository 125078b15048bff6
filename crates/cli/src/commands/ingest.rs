//! Ingest command handler.
//!
//! Loads math Q/A datasets into the local knowledge base.

use clap::Args;
use mathtutor_core::{AppConfig, AppResult};
use mathtutor_knowledge::{create_provider, IngestOptions};
use std::path::PathBuf;

/// Ingest math datasets into the knowledge base
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// JSONL dataset files to ingest
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Reset the knowledge base before ingesting
    #[arg(long)]
    pub reset: bool,

    /// Chunk size in characters
    #[arg(long, default_value = "1000")]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks
    #[arg(long, default_value = "200")]
    pub chunk_overlap: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command for {} file(s)", self.paths.len());

        let embedder = create_provider(
            &config.embedding_provider,
            &config.endpoint,
            &config.embedding_model,
            config.embedding_dim,
        )?;

        let options = IngestOptions {
            paths: self.paths.clone(),
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            reset: self.reset,
        };

        let stats =
            mathtutor_knowledge::ingest::ingest(&config.index_path(), embedder.as_ref(), options)
                .await?;

        if self.json {
            let output = serde_json::json!({
                "documentsCount": stats.documents_count,
                "chunksCount": stats.chunks_count,
                "bytesProcessed": stats.bytes_processed,
                "durationSecs": stats.duration_secs,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "Ingested {} documents ({} chunks, {} bytes) in {:.2}s",
                stats.documents_count, stats.chunks_count, stats.bytes_processed, stats.duration_secs
            );
        }

        Ok(())
    }
}
