//! Persisted vector index.
//!
//! One SQLite file at the configured path holds the index for exactly one
//! document: a single metadata row (document name, embedding model, dims,
//! chunk count, source-text hash, built-at) and one row per chunk with its
//! embedding stored as a little-endian f32 BLOB.
//!
//! Rebuilds are replace-by-rename: the new index is written to a uniquely
//! named temp file next to the target and atomically renamed over the old
//! one, so a reader never observes a partially written index. The rollback
//! journal mode keeps the index a single file, which is what makes the
//! rename atomic.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

use crate::embedding::{blob_to_vec, cosine_similarity, vec_to_blob};
use crate::error::PipelineError;
use crate::models::{Chunk, ScoredChunk};

/// Metadata describing the persisted index.
#[derive(Debug, Clone)]
pub struct IndexMeta {
    pub document: String,
    pub model: String,
    pub dims: usize,
    pub chunk_count: i64,
    pub source_hash: String,
    pub built_at: i64,
}

/// Write a complete index for one document, replacing any prior index at
/// `path`.
pub async fn write_index(
    path: &Path,
    meta: &IndexMeta,
    chunks: &[Chunk],
    vectors: &[Vec<f32>],
) -> Result<(), PipelineError> {
    if chunks.len() != vectors.len() {
        return Err(PipelineError::Storage(format!(
            "chunk/vector count mismatch: {} chunks, {} vectors",
            chunks.len(),
            vectors.len()
        )));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("index.db");
    let tmp_path = path.with_file_name(format!("{}.tmp-{}", file_name, Uuid::new_v4()));

    if let Err(e) = build_index_file(&tmp_path, meta, chunks, vectors).await {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }

    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    Ok(())
}

async fn build_index_file(
    path: &Path,
    meta: &IndexMeta,
    chunks: &[Chunk],
    vectors: &[Vec<f32>],
) -> Result<(), PipelineError> {
    let pool = connect_writer(path).await?;

    sqlx::query(
        r#"
        CREATE TABLE index_meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            document TEXT NOT NULL,
            model TEXT NOT NULL,
            dims INTEGER NOT NULL,
            chunk_count INTEGER NOT NULL,
            source_hash TEXT NOT NULL,
            built_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE chunks (
            chunk_index INTEGER PRIMARY KEY,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await?;

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO index_meta (id, document, model, dims, chunk_count, source_hash, built_at)
        VALUES (1, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&meta.document)
    .bind(&meta.model)
    .bind(meta.dims as i64)
    .bind(meta.chunk_count)
    .bind(&meta.source_hash)
    .bind(meta.built_at)
    .execute(&mut *tx)
    .await?;

    for (chunk, vector) in chunks.iter().zip(vectors.iter()) {
        sqlx::query("INSERT INTO chunks (chunk_index, text, embedding) VALUES (?, ?, ?)")
            .bind(chunk.index)
            .bind(&chunk.text)
            .bind(vec_to_blob(vector))
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    pool.close().await;
    Ok(())
}

/// Read the metadata row of the persisted index.
///
/// # Errors
///
/// [`PipelineError::IndexNotFound`] when no index exists at `path`.
pub async fn read_meta(path: &Path) -> Result<IndexMeta, PipelineError> {
    let pool = connect_reader(path).await?;

    let row = sqlx::query(
        "SELECT document, model, dims, chunk_count, source_hash, built_at FROM index_meta WHERE id = 1",
    )
    .fetch_optional(&pool)
    .await?;

    pool.close().await;

    let row = row.ok_or_else(|| PipelineError::Storage("index metadata missing".to_string()))?;

    let dims: i64 = row.get("dims");
    Ok(IndexMeta {
        document: row.get("document"),
        model: row.get("model"),
        dims: dims as usize,
        chunk_count: row.get("chunk_count"),
        source_hash: row.get("source_hash"),
        built_at: row.get("built_at"),
    })
}

/// Return the `k` chunks most similar to `query_vec`, cosine similarity
/// descending, chunk index ascending on ties.
pub async fn top_chunks(
    path: &Path,
    query_vec: &[f32],
    k: usize,
) -> Result<Vec<ScoredChunk>, PipelineError> {
    let pool = connect_reader(path).await?;

    let rows = sqlx::query("SELECT chunk_index, text, embedding FROM chunks")
        .fetch_all(&pool)
        .await?;

    pool.close().await;

    let mut scored: Vec<ScoredChunk> = rows
        .iter()
        .map(|row| {
            let blob: Vec<u8> = row.get("embedding");
            let vector = blob_to_vec(&blob);
            ScoredChunk {
                index: row.get("chunk_index"),
                text: row.get("text"),
                score: cosine_similarity(query_vec, &vector),
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.index.cmp(&b.index))
    });
    scored.truncate(k);

    Ok(scored)
}

async fn connect_writer(path: &Path) -> Result<SqlitePool, PipelineError> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Delete);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    Ok(pool)
}

async fn connect_reader(path: &Path) -> Result<SqlitePool, PipelineError> {
    if !path.is_file() {
        return Err(PipelineError::IndexNotFound(path.to_path_buf()));
    }

    let options =
        SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?.read_only(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    Ok(pool)
}
