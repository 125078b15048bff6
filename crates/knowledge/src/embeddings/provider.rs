//! Embedding provider trait and factory.

use mathtutor_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "ollama", "trigram")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Knowledge("No embedding returned".to_string()))
    }
}

/// Create an embedding provider by name.
///
/// # Arguments
/// * `provider` - "ollama" or "trigram"
/// * `endpoint` - Ollama endpoint (ignored by the trigram provider)
/// * `model` - Embedding model identifier
/// * `dimensions` - Expected embedding dimension
pub fn create_provider(
    provider: &str,
    endpoint: &str,
    model: &str,
    dimensions: usize,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match provider {
        "ollama" => {
            let provider =
                super::providers::ollama::OllamaEmbedder::new(endpoint, model, dimensions);
            Ok(Arc::new(provider))
        }

        "trigram" => {
            let provider = super::providers::trigram::TrigramEmbedder::new(dimensions);
            Ok(Arc::new(provider))
        }

        _ => Err(AppError::Knowledge(format!(
            "Unknown embedding provider: '{}'. Supported providers: ollama, trigram",
            provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_trigram_provider() {
        let provider = create_provider("trigram", "", "trigram-v1", 384).unwrap();
        assert_eq!(provider.provider_name(), "trigram");
        assert_eq!(provider.dimensions(), 384);
    }

    #[test]
    fn test_create_ollama_provider() {
        let provider =
            create_provider("ollama", "http://localhost:11434", "all-minilm", 384).unwrap();
        assert_eq!(provider.provider_name(), "ollama");
        assert_eq!(provider.model_name(), "all-minilm");
    }

    #[test]
    fn test_create_unknown_provider() {
        let result = create_provider("unknown", "", "m", 384);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unknown embedding provider"));
    }

    #[tokio::test]
    async fn test_provider_embed_single() {
        let provider = create_provider("trigram", "", "trigram-v1", 384).unwrap();
        let embedding = provider.embed("quadratic formula").await.unwrap();
        assert_eq!(embedding.len(), 384);
    }
}
