//! Knowledge base type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A source document in the knowledge base.
///
/// One document corresponds to one worked math problem (problem statement
/// plus its step-by-step solution) from an ingested dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbDocument {
    /// Unique document identifier
    pub id: String,

    /// Dataset the record came from (e.g., "step-dpo", "metamath")
    pub dataset: String,

    /// Problem category if the dataset provides one
    pub problem_type: Option<String>,

    /// When this document was ingested
    pub ingested_at: DateTime<Utc>,

    /// Document size in bytes
    pub byte_count: u64,
}

/// A text chunk with embedding, stored in the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbChunk {
    /// Unique chunk identifier
    pub id: String,

    /// Parent document ID
    pub document_id: String,

    /// Position within the document
    pub position: u32,

    /// Text content
    pub text: String,

    /// Embedding vector (normalized)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// Statistics for the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbStats {
    /// Number of documents
    pub documents_count: u32,

    /// Number of chunks
    pub chunks_count: u32,

    /// Database size in bytes
    pub db_size_bytes: u64,
}

/// Internal chunk candidate before embedding.
#[derive(Debug, Clone)]
pub struct ChunkCandidate {
    pub document_id: String,
    pub position: u32,
    pub text: String,
}
