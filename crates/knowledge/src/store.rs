//! Vector store: query-time retrieval over the SQLite index.
//!
//! Embeds the query, runs top-k cosine search, drops chunks below the
//! relevance threshold, and deduplicates near-identical chunks by prefix.

use crate::embeddings::EmbeddingProvider;
use crate::index;
use mathtutor_core::{AppError, AppResult};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Prefix length used for naive deduplication of retrieved chunks.
/// Overlapping chunks from the same document share long common prefixes.
const DEDUP_PREFIX_LEN: usize = 80;

/// A retrieved text snippet with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredSnippet {
    pub text: String,
    pub score: f32,
}

/// Trait for knowledge retrieval backends.
///
/// The agent graph depends on this seam so routing can be tested against
/// scripted stores.
#[async_trait::async_trait]
pub trait Retriever: Send + Sync {
    /// Retrieve relevant snippets for a query, best match first.
    async fn retrieve(&self, query: &str) -> AppResult<Vec<ScoredSnippet>>;
}

/// SQLite-backed vector store.
///
/// The connection is wrapped in a mutex so one store handle can be shared
/// across the HTTP server's request tasks. Retrieval is read-only after
/// ingestion, so contention is not a concern.
pub struct VectorStore {
    conn: Mutex<Connection>,
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
    relevance_threshold: f32,
}

impl VectorStore {
    /// Open a vector store over an existing index database.
    pub fn open(
        index_path: &Path,
        embedder: Arc<dyn EmbeddingProvider>,
        top_k: usize,
        relevance_threshold: f32,
    ) -> AppResult<Self> {
        if !index_path.exists() {
            return Err(AppError::Knowledge(format!(
                "Knowledge base index not found at {:?}. Run 'mathtutor ingest' first.",
                index_path
            )));
        }

        let conn = index::init_index(index_path)?;
        Ok(Self {
            conn: Mutex::new(conn),
            embedder,
            top_k,
            relevance_threshold,
        })
    }

    /// Create a store over an in-memory index (tests and ingestion).
    pub fn in_memory(
        embedder: Arc<dyn EmbeddingProvider>,
        top_k: usize,
        relevance_threshold: f32,
    ) -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Knowledge(format!("Failed to open in-memory index: {}", e)))?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                dataset TEXT NOT NULL,
                problem_type TEXT,
                ingested_at TEXT NOT NULL,
                byte_count INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS chunks (
                id TEXT PRIMARY KEY,
                document_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                text TEXT NOT NULL,
                embedding BLOB NOT NULL
            );
            "#,
        )
        .map_err(|e| AppError::Knowledge(format!("Failed to create tables: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
            embedder,
            top_k,
            relevance_threshold,
        })
    }

    /// Run a closure against the underlying connection.
    pub fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> AppResult<T>) -> AppResult<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Knowledge("Index connection poisoned".to_string()))?;
        f(&conn)
    }

    /// The embedding provider this store was opened with.
    pub fn embedder(&self) -> Arc<dyn EmbeddingProvider> {
        Arc::clone(&self.embedder)
    }
}

#[async_trait::async_trait]
impl Retriever for VectorStore {
    async fn retrieve(&self, query: &str) -> AppResult<Vec<ScoredSnippet>> {
        let query_embedding = self.embedder.embed(query).await?;

        let results = self.with_conn(|conn| index::query_chunks(conn, &query_embedding, self.top_k))?;

        if !results.is_empty() {
            let scores: Vec<f32> = results.iter().map(|(_, s)| *s).collect();
            tracing::debug!("Retrieved {} chunks - scores: {:?}", results.len(), scores);
        }

        let snippets: Vec<ScoredSnippet> = results
            .into_iter()
            .filter(|(_, score)| *score >= self.relevance_threshold)
            .map(|(chunk, score)| ScoredSnippet {
                text: chunk.text,
                score,
            })
            .collect();

        let snippets = dedup_by_prefix(snippets, DEDUP_PREFIX_LEN);

        if snippets.is_empty() {
            tracing::info!(
                "No relevant chunks (all scores below {:.2} threshold)",
                self.relevance_threshold
            );
        } else {
            tracing::info!(
                "Retrieved {} relevant chunks (top score: {:.3})",
                snippets.len(),
                snippets.first().map(|s| s.score).unwrap_or(0.0)
            );
        }

        Ok(snippets)
    }
}

/// Drop snippets whose normalized prefix was already seen.
///
/// Chunk overlap means adjacent chunks of the same document often start with
/// the same text; keeping only the first (highest-scored) avoids stuffing
/// the prompt with repeats.
fn dedup_by_prefix(snippets: Vec<ScoredSnippet>, prefix_len: usize) -> Vec<ScoredSnippet> {
    let mut seen = std::collections::HashSet::new();
    let mut deduped = Vec::with_capacity(snippets.len());

    for snippet in snippets {
        let normalized: String = snippet
            .text
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        let prefix: String = normalized.chars().take(prefix_len).collect();

        if seen.insert(prefix) {
            deduped.push(snippet);
        }
    }

    deduped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::TrigramEmbedder;
    use crate::index::{insert_chunk, query_chunks};
    use crate::types::KbChunk;

    fn snippet(text: &str, score: f32) -> ScoredSnippet {
        ScoredSnippet {
            text: text.to_string(),
            score,
        }
    }

    #[test]
    fn test_dedup_by_prefix_drops_repeats() {
        let snippets = vec![
            snippet("Mathematical Problem: solve 2x = 8 for x. Step one divide.", 0.9),
            snippet("Mathematical Problem: solve 2x = 8 for x. Step two verify.", 0.8),
            snippet("A completely different worked example about integrals.", 0.7),
        ];

        let deduped = dedup_by_prefix(snippets, 40);
        assert_eq!(deduped.len(), 2);
        assert!((deduped[0].score - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_dedup_normalizes_whitespace_and_case() {
        let snippets = vec![
            snippet("Solve   The Equation here", 0.9),
            snippet("solve the equation here", 0.8),
        ];

        let deduped = dedup_by_prefix(snippets, 40);
        assert_eq!(deduped.len(), 1);
    }

    #[tokio::test]
    async fn test_retrieve_applies_threshold() {
        let embedder = Arc::new(TrigramEmbedder::new(128));
        let store = VectorStore::in_memory(embedder.clone(), 4, 0.75).unwrap();

        // A chunk nearly identical to the query and one unrelated
        let texts = [
            "quadratic equation roots discriminant formula",
            "chocolate cake baking temperature",
        ];
        for (i, text) in texts.iter().enumerate() {
            let embedding = embedder.embed(text).await.unwrap();
            store
                .with_conn(|conn| {
                    insert_chunk(
                        conn,
                        &KbChunk {
                            id: format!("c{}", i),
                            document_id: "doc1".to_string(),
                            position: i as u32,
                            text: text.to_string(),
                            embedding: Some(embedding.clone()),
                        },
                    )
                })
                .unwrap();
        }

        let snippets = store
            .retrieve("quadratic equation roots discriminant formula")
            .await
            .unwrap();

        assert_eq!(snippets.len(), 1);
        assert!(snippets[0].text.contains("quadratic"));
        assert!(snippets[0].score >= 0.75);
    }

    #[tokio::test]
    async fn test_retrieve_empty_store() {
        let embedder = Arc::new(TrigramEmbedder::new(128));
        let store = VectorStore::in_memory(embedder, 4, 0.75).unwrap();

        let snippets = store.retrieve("anything").await.unwrap();
        assert!(snippets.is_empty());
    }

    #[test]
    fn test_in_memory_schema_matches_query_path() {
        let embedder = Arc::new(TrigramEmbedder::new(8));
        let store = VectorStore::in_memory(embedder, 4, 0.0).unwrap();

        store
            .with_conn(|conn| {
                insert_chunk(
                    conn,
                    &KbChunk {
                        id: "c1".to_string(),
                        document_id: "d1".to_string(),
                        position: 0,
                        text: "t".to_string(),
                        embedding: Some(vec![1.0; 8]),
                    },
                )?;
                let results = query_chunks(conn, &[1.0; 8], 1)?;
                assert_eq!(results.len(), 1);
                Ok(())
            })
            .unwrap();
    }
}
