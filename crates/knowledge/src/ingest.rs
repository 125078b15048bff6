//! Knowledge base ingestion.
//!
//! Loads worked math problems from JSONL dataset exports, renders each
//! record into a single retrievable document, chunks it with overlap,
//! embeds the chunks, and inserts everything into the SQLite index.

use crate::chunker;
use crate::embeddings::EmbeddingProvider;
use crate::index;
use crate::types::{KbChunk, KbDocument, KbStats};
use chrono::Utc;
use mathtutor_core::{AppError, AppResult};
use serde::Deserialize;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// One record from a math Q/A dataset export.
///
/// Field aliases cover the common dataset schemas: Step-DPO uses
/// `prompt`/`chosen`, MetaMathQA uses `query`/`response`.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestRecord {
    #[serde(alias = "query", alias = "prompt", alias = "question")]
    pub problem: String,

    #[serde(alias = "response", alias = "chosen")]
    pub solution: String,

    #[serde(default)]
    pub answer: Option<String>,

    #[serde(default, alias = "type")]
    pub problem_type: Option<String>,
}

/// Options for the ingest operation.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// JSONL files to ingest
    pub paths: Vec<PathBuf>,

    /// Chunk size in characters
    pub chunk_size: usize,

    /// Overlap between chunks
    pub chunk_overlap: usize,

    /// Reset the index before ingesting
    pub reset: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            chunk_size: 1000,
            chunk_overlap: 200,
            reset: false,
        }
    }
}

/// Statistics from an ingest operation.
#[derive(Debug, Clone)]
pub struct IngestStats {
    pub documents_count: u32,
    pub chunks_count: u32,
    pub bytes_processed: u64,
    pub duration_secs: f64,
}

/// Ingest JSONL dataset files into the knowledge base index.
pub async fn ingest(
    index_path: &Path,
    embedder: &dyn EmbeddingProvider,
    options: IngestOptions,
) -> AppResult<IngestStats> {
    let start = Instant::now();

    tracing::info!("Starting ingest of {} file(s)", options.paths.len());

    let conn = index::init_index(index_path)?;

    if options.reset {
        tracing::info!("Resetting knowledge base");
        index::reset_index(&conn)?;
    }

    let mut documents_count = 0u32;
    let mut chunks_count = 0u32;
    let mut bytes_processed = 0u64;

    for path in &options.paths {
        let dataset = dataset_name(path);
        let records = load_jsonl(path)?;

        tracing::info!("Loaded {} records from {:?}", records.len(), path);

        for record in records {
            let (doc_chunks, bytes) =
                ingest_record(&conn, embedder, &dataset, &record, &options).await?;
            documents_count += 1;
            chunks_count += doc_chunks;
            bytes_processed += bytes;
        }
    }

    let duration = start.elapsed();

    tracing::info!(
        "Ingest completed: {} documents, {} chunks, {} bytes in {:.2}s",
        documents_count,
        chunks_count,
        bytes_processed,
        duration.as_secs_f64()
    );

    Ok(IngestStats {
        documents_count,
        chunks_count,
        bytes_processed,
        duration_secs: duration.as_secs_f64(),
    })
}

/// Ingest a single record: render, chunk, embed, insert.
async fn ingest_record(
    conn: &rusqlite::Connection,
    embedder: &dyn EmbeddingProvider,
    dataset: &str,
    record: &IngestRecord,
    options: &IngestOptions,
) -> AppResult<(u32, u64)> {
    let text = render_document(record);
    let byte_count = text.len() as u64;

    let document_id = uuid::Uuid::new_v4().to_string();
    let document = KbDocument {
        id: document_id.clone(),
        dataset: dataset.to_string(),
        problem_type: record.problem_type.clone(),
        ingested_at: Utc::now(),
        byte_count,
    };
    index::insert_document(conn, &document)?;

    let candidates = chunker::chunk_text(
        &document_id,
        &text,
        options.chunk_size,
        options.chunk_overlap,
    );

    let texts: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();
    let embeddings = embedder.embed_batch(&texts).await?;

    let mut inserted = 0u32;
    for (candidate, embedding) in candidates.into_iter().zip(embeddings) {
        let chunk = KbChunk {
            id: uuid::Uuid::new_v4().to_string(),
            document_id: candidate.document_id,
            position: candidate.position,
            text: candidate.text,
            embedding: Some(embedding),
        };
        index::insert_chunk(conn, &chunk)?;
        inserted += 1;
    }

    Ok((inserted, byte_count))
}

/// Render a record into the document text stored in the index.
fn render_document(record: &IngestRecord) -> String {
    let mut text = format!(
        "Mathematical Problem: {}\n\nStep-by-Step Solution: {}",
        record.problem.trim(),
        record.solution.trim()
    );

    if let Some(ref answer) = record.answer {
        text.push_str(&format!("\n\nFinal Answer: {}", answer.trim()));
    }

    text
}

/// Load records from a JSONL file, skipping unparsable lines with a warning.
fn load_jsonl(path: &Path) -> AppResult<Vec<IngestRecord>> {
    let file = std::fs::File::open(path)
        .map_err(|e| AppError::Knowledge(format!("Failed to open {:?}: {}", path, e)))?;

    let mut records = Vec::new();
    for (lineno, line) in std::io::BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| AppError::Knowledge(format!("Read error: {}", e)))?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<IngestRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Skipping line {} of {:?}: {}", lineno + 1, path, e);
            }
        }
    }

    Ok(records)
}

/// Dataset name from the file stem (e.g., "metamath.jsonl" -> "metamath").
fn dataset_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Get statistics for the knowledge base.
pub fn stats(index_path: &Path) -> AppResult<KbStats> {
    if !index_path.exists() {
        return Err(AppError::Knowledge(format!(
            "Knowledge base index not found at {:?}",
            index_path
        )));
    }

    let conn = index::init_index(index_path)?;
    let mut stats = index::get_stats(&conn)?;
    stats.db_size_bytes = std::fs::metadata(index_path).map(|m| m.len()).unwrap_or(0);
    Ok(stats)
}

/// Clear the knowledge base index.
pub fn clean(index_path: &Path) -> AppResult<()> {
    if !index_path.exists() {
        return Err(AppError::Knowledge(format!(
            "Knowledge base index not found at {:?}",
            index_path
        )));
    }

    let conn = index::init_index(index_path)?;
    index::reset_index(&conn)
}
