//! SQLite-backed vector index for knowledge chunks.

use crate::types::{KbChunk, KbDocument, KbStats};
use mathtutor_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use std::path::Path;

/// Initialize the SQLite index database.
pub fn init_index(db_path: &Path) -> AppResult<Connection> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::Knowledge(format!("Failed to create index directory: {}", e)))?;
    }

    let conn = Connection::open(db_path)
        .map_err(|e| AppError::Knowledge(format!("Failed to open SQLite index: {}", e)))?;

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
            embedding BLOB NOT NULL,
            FOREIGN KEY (document_id) REFERENCES documents(id)
        );

        CREATE INDEX IF NOT EXISTS idx_chunks_document ON chunks(document_id);
        "#,
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to create tables: {}", e)))?;

    tracing::debug!("Initialized SQLite index at {:?}", db_path);
    Ok(conn)
}

/// Insert a document into the index.
pub fn insert_document(conn: &Connection, document: &KbDocument) -> AppResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO documents (id, dataset, problem_type, ingested_at, byte_count)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            document.id,
            document.dataset,
            document.problem_type,
            document.ingested_at.to_rfc3339(),
            document.byte_count as i64,
        ],
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to insert document: {}", e)))?;

    Ok(())
}

/// Insert a chunk with embedding into the index.
pub fn insert_chunk(conn: &Connection, chunk: &KbChunk) -> AppResult<()> {
    let embedding_bytes = embedding_to_bytes(
        chunk
            .embedding
            .as_ref()
            .ok_or_else(|| AppError::Knowledge("Chunk missing embedding".to_string()))?,
    );

    conn.execute(
        "INSERT OR REPLACE INTO chunks (id, document_id, position, text, embedding)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            chunk.id,
            chunk.document_id,
            chunk.position as i64,
            chunk.text,
            embedding_bytes,
        ],
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to insert chunk: {}", e)))?;

    Ok(())
}

/// Query the index for the top-k most similar chunks.
///
/// Brute-force scan: every embedding is decoded and scored against the
/// query. Fine for knowledge bases in the tens of thousands of chunks.
pub fn query_chunks(
    conn: &Connection,
    query_embedding: &[f32],
    top_k: usize,
) -> AppResult<Vec<(KbChunk, f32)>> {
    let mut stmt = conn
        .prepare("SELECT id, document_id, position, text, embedding FROM chunks")
        .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

    let chunks_iter = stmt
        .query_map([], |row| {
            let embedding_bytes: Vec<u8> = row.get(4)?;
            let embedding = bytes_to_embedding(&embedding_bytes)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

            Ok(KbChunk {
                id: row.get(0)?,
                document_id: row.get(1)?,
                position: row.get::<_, i64>(2)? as u32,
                text: row.get(3)?,
                embedding: Some(embedding),
            })
        })
        .map_err(|e| AppError::Knowledge(format!("Failed to query chunks: {}", e)))?;

    let mut results: Vec<(KbChunk, f32)> = chunks_iter
        .filter_map(|r| r.ok())
        .map(|chunk| {
            let score = match chunk.embedding.as_deref() {
                Some(embedding) => cosine_similarity(query_embedding, embedding),
                None => 0.0,
            };
            (chunk, score)
        })
        .collect();

    results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(top_k);

    tracing::debug!(
        "Retrieved {} chunks (requested top-{})",
        results.len(),
        top_k
    );

    Ok(results)
}

/// Get statistics for the index.
pub fn get_stats(conn: &Connection) -> AppResult<KbStats> {
    let documents_count: u32 = conn
        .query_row("SELECT COUNT(*) FROM documents", [], |row| {
            row.get::<_, i64>(0).map(|v| v as u32)
        })
        .map_err(|e| AppError::Knowledge(format!("Failed to count documents: {}", e)))?;

    let chunks_count: u32 = conn
        .query_row("SELECT COUNT(*) FROM chunks", [], |row| {
            row.get::<_, i64>(0).map(|v| v as u32)
        })
        .map_err(|e| AppError::Knowledge(format!("Failed to count chunks: {}", e)))?;

    Ok(KbStats {
        documents_count,
        chunks_count,
        db_size_bytes: 0,
    })
}

/// Reset the index (delete all data).
pub fn reset_index(conn: &Connection) -> AppResult<()> {
    conn.execute("DELETE FROM chunks", [])
        .map_err(|e| AppError::Knowledge(format!("Failed to delete chunks: {}", e)))?;

    conn.execute("DELETE FROM documents", [])
        .map_err(|e| AppError::Knowledge(format!("Failed to delete documents: {}", e)))?;

    tracing::info!("Reset knowledge base index");
    Ok(())
}

/// Convert embedding vector to little-endian bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert bytes back to an embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Knowledge(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    let mut embedding = Vec::with_capacity(bytes.len() / 4);
    for chunk in bytes.chunks_exact(4) {
        embedding.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }

    Ok(embedding)
}

/// Calculate cosine similarity between two vectors.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::NamedTempFile;

    fn insert_doc1(conn: &Connection) {
        let document = KbDocument {
            id: "doc1".to_string(),
            dataset: "metamath".to_string(),
            problem_type: Some("algebra".to_string()),
            ingested_at: Utc::now(),
            byte_count: 100,
        };
        insert_document(conn, &document).unwrap();
    }

    fn chunk(id: &str, embedding: Vec<f32>) -> KbChunk {
        KbChunk {
            id: id.to_string(),
            document_id: "doc1".to_string(),
            position: 0,
            text: format!("chunk {}", id),
            embedding: Some(embedding),
        }
    }

    #[test]
    fn test_init_index() {
        let temp_file = NamedTempFile::new().unwrap();
        let conn = init_index(temp_file.path()).unwrap();

        let table_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table'",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert!(table_count >= 2); // documents and chunks tables
    }

    #[test]
    fn test_insert_and_query() {
        let temp_file = NamedTempFile::new().unwrap();
        let conn = init_index(temp_file.path()).unwrap();

        let document = KbDocument {
            id: "doc1".to_string(),
            dataset: "metamath".to_string(),
            problem_type: Some("algebra".to_string()),
            ingested_at: Utc::now(),
            byte_count: 100,
        };
        insert_document(&conn, &document).unwrap();

        insert_chunk(&conn, &chunk("c1", vec![1.0, 0.0, 0.0])).unwrap();
        insert_chunk(&conn, &chunk("c2", vec![0.0, 1.0, 0.0])).unwrap();

        let results = query_chunks(&conn, &[1.0, 0.0, 0.0], 5).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0.id, "c1");
        assert!((results[0].1 - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_top_k_truncation() {
        let temp_file = NamedTempFile::new().unwrap();
        let conn = init_index(temp_file.path()).unwrap();
        insert_doc1(&conn);

        for i in 0..10 {
            insert_chunk(&conn, &chunk(&format!("c{}", i), vec![1.0, i as f32, 0.0])).unwrap();
        }

        let results = query_chunks(&conn, &[1.0, 0.0, 0.0], 3).unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_reset_and_stats() {
        let temp_file = NamedTempFile::new().unwrap();
        let conn = init_index(temp_file.path()).unwrap();
        insert_doc1(&conn);

        insert_chunk(&conn, &chunk("c1", vec![1.0, 0.0])).unwrap();
        reset_index(&conn).unwrap();

        let stats = get_stats(&conn).unwrap();
        assert_eq!(stats.chunks_count, 0);
        assert_eq!(stats.documents_count, 0);
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 0.001);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 0.001);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_embedding_roundtrip() {
        let original = vec![0.25, -1.5, 3.125];
        let bytes = embedding_to_bytes(&original);
        assert_eq!(bytes_to_embedding(&bytes).unwrap(), original);
        assert!(bytes_to_embedding(&bytes[..5]).is_err());
    }
}
