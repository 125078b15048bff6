//! Embedding generation for the knowledge base.
//!
//! Provider-agnostic: the real deployment uses Ollama embedding models, and
//! a deterministic trigram provider covers tests and offline use.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
