//! Document processing pipeline: load, chunk, embed, persist.
//!
//! Triggered once per document on demand. The persisted index is the only
//! hand-off to the query pipeline; a document must be processed before any
//! question against it can be answered.

use anyhow::Result;
use sha2::{Digest, Sha256};

use crate::chunk::split;
use crate::config::Config;
use crate::embedding;
use crate::error::PipelineError;
use crate::index::{self, IndexMeta};
use crate::loader;
use crate::models::Chunk;

pub async fn run_process(config: &Config, name: &str) -> Result<()> {
    let text = loader::load_text(config, name)?;

    let pieces = split(
        &text,
        config.chunking.max_chars,
        config.chunking.overlap_chars,
    )?;
    let chunks: Vec<Chunk> = pieces
        .into_iter()
        .enumerate()
        .map(|(i, text)| Chunk {
            index: i as i64,
            text,
        })
        .collect();

    let vectors = embed_chunks(config, &chunks).await?;

    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let source_hash = format!("{:x}", hasher.finalize());

    let meta = IndexMeta {
        document: name.to_string(),
        model: config.embedding.model.clone(),
        dims: config.embedding.dims,
        chunk_count: chunks.len() as i64,
        source_hash,
        built_at: chrono::Utc::now().timestamp(),
    };

    index::write_index(&config.index.path, &meta, &chunks, &vectors).await?;

    println!("process {}", name);
    println!("  extracted chars: {}", text.chars().count());
    println!("  chunks: {}", chunks.len());
    println!("  embedded: {}", vectors.len());
    println!("  index: {}", config.index.path.display());
    println!("ok");

    Ok(())
}

/// Embed all chunks in config-sized batches. Vector order matches chunk
/// order.
async fn embed_chunks(config: &Config, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>, PipelineError> {
    let mut vectors = Vec::with_capacity(chunks.len());

    for batch in chunks.chunks(config.embedding.batch_size) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let batch_vectors = embedding::embed_texts(&config.embedding, &texts).await?;
        vectors.extend(batch_vectors);
    }

    if let Some(first) = vectors.first() {
        if first.len() != config.embedding.dims {
            return Err(PipelineError::EmbeddingService(format!(
                "model returned {}-dim vectors, embedding.dims is {}",
                first.len(),
                config.embedding.dims
            )));
        }
    }

    Ok(vectors)
}
