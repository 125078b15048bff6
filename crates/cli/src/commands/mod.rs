//! Command handlers for the Math Tutor Agent CLI.

pub mod clean;
pub mod ingest;
pub mod repl;
pub mod serve;
pub mod stats;

use std::sync::Arc;

use mathtutor_agent::{MathAgent, MathAgentBuilder};
use mathtutor_core::{AppConfig, AppResult};
use mathtutor_knowledge::{create_provider, VectorStore};
use mathtutor_search::TavilyClient;

// Re-export command types for convenience
pub use clean::CleanCommand;
pub use ingest::IngestCommand;
pub use repl::ReplCommand;
pub use serve::ServeCommand;
pub use stats::StatsCommand;

/// Build the agent with its process-wide singleton handles.
///
/// Constructed once per process; the request path only reads from it.
/// The search client is attached only when an API key is present.
pub fn build_agent(config: &AppConfig) -> AppResult<Arc<MathAgent>> {
    let llm = mathtutor_llm::create_client("ollama", Some(config.endpoint.as_str()))?;

    let embedder = create_provider(
        &config.embedding_provider,
        &config.endpoint,
        &config.embedding_model,
        config.embedding_dim,
    )?;

    let store = VectorStore::open(
        &config.index_path(),
        embedder,
        config.top_k,
        config.relevance_threshold,
    )?;

    let mut builder = MathAgentBuilder::new(llm, Arc::new(store))
        .with_model(&config.model)
        .with_search_min_score(config.search_min_score);

    match config.search_api_key() {
        Some(api_key) => {
            builder = builder.with_search(Arc::new(TavilyClient::new(api_key)));
        }
        None => {
            tracing::warn!(
                "{} not set; web-search fallback disabled",
                mathtutor_core::config::SEARCH_API_KEY_ENV
            );
        }
    }

    Ok(Arc::new(builder.build()))
}
