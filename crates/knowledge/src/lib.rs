//! Knowledge base for the Math Tutor Agent.
//!
//! Provides local-first retrieval over a SQLite-backed vector index of
//! worked math problems. Ingestion turns JSONL problem/solution records
//! into overlapping text chunks with embeddings; retrieval runs brute-force
//! cosine similarity, applies a fixed relevance threshold, and deduplicates
//! near-identical chunks by prefix.

pub mod chunker;
pub mod embeddings;
pub mod index;
pub mod ingest;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use embeddings::{create_provider, EmbeddingProvider};
pub use ingest::{IngestOptions, IngestStats};
pub use store::{Retriever, ScoredSnippet, VectorStore};
pub use types::{KbChunk, KbDocument, KbStats};
