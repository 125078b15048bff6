//! LLM provider factory.
//!
//! Creates LLM clients based on application configuration. Only the Ollama
//! runtime is wired up today; the factory seam keeps the agent code
//! provider-agnostic.

use crate::client::LlmClient;
use crate::providers::OllamaClient;
use mathtutor_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier (currently only "ollama")
/// * `endpoint` - Optional custom endpoint URL
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown.
pub fn create_client(provider: &str, endpoint: Option<&str>) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "ollama" => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            let client = OllamaClient::with_base_url(base_url);
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!(
            "Unknown LLM provider: {}. Supported: ollama",
            provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None);
        assert!(client.is_ok());
        assert_eq!(client.unwrap().provider_name(), "ollama");
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let client = create_client("ollama", Some("http://localhost:8080"));
        assert!(client.is_ok());
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None) {
            Err(err) => assert!(err.to_string().contains("Unknown LLM provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
