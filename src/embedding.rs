//! Gemini embedding client and vector utilities.
//!
//! Calls the `batchEmbedContents` endpoint of the Gemini REST API. The same
//! model must produce index-time and query-time vectors; the retriever
//! enforces that by comparing the configured model against the model recorded
//! in the persisted index.
//!
//! Retry strategy for transient errors (HTTP 429, 5xx, network):
//! exponential backoff 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5). Other 4xx
//! responses fail immediately.

use std::time::Duration;

use crate::config::{self, EmbeddingConfig};
use crate::error::PipelineError;

/// Embed a batch of texts, returning one vector per input in input order.
///
/// One API call per invocation; callers batch according to
/// `embedding.batch_size`.
///
/// # Errors
///
/// [`PipelineError::Config`] when the API key is missing,
/// [`PipelineError::EmbeddingService`] on remote failure after retries.
pub async fn embed_texts(
    config: &EmbeddingConfig,
    texts: &[String],
) -> Result<Vec<Vec<f32>>, PipelineError> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let api_key = config::api_key()?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| PipelineError::EmbeddingService(e.to_string()))?;

    let url = format!(
        "{}/models/{}:batchEmbedContents",
        config.base_url, config.model
    );

    let requests: Vec<serde_json::Value> = texts
        .iter()
        .map(|text| {
            serde_json::json!({
                "model": format!("models/{}", config.model),
                "content": { "parts": [{ "text": text }] },
            })
        })
        .collect();
    let body = serde_json::json!({ "requests": requests });

    let mut last_err = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let delay = Duration::from_secs(1 << (attempt - 1).min(5));
            tokio::time::sleep(delay).await;
        }

        let resp = client
            .post(&url)
            .header("x-goog-api-key", &api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await;

        match resp {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    let json: serde_json::Value = response
                        .json()
                        .await
                        .map_err(|e| PipelineError::EmbeddingService(e.to_string()))?;
                    let vectors = parse_embed_response(&json)?;
                    if vectors.len() != texts.len() {
                        return Err(PipelineError::EmbeddingService(format!(
                            "embedding count mismatch: sent {} texts, got {} vectors",
                            texts.len(),
                            vectors.len()
                        )));
                    }
                    return Ok(vectors);
                }

                // Rate limited or server error, retry
                if status.as_u16() == 429 || status.is_server_error() {
                    let body_text = response.text().await.unwrap_or_default();
                    last_err = Some(PipelineError::EmbeddingService(format!(
                        "Gemini API error {}: {}",
                        status, body_text
                    )));
                    continue;
                }

                // Client error (invalid key, quota misconfiguration), don't retry
                let body_text = response.text().await.unwrap_or_default();
                return Err(PipelineError::EmbeddingService(format!(
                    "Gemini API error {}: {}",
                    status, body_text
                )));
            }
            Err(e) => {
                last_err = Some(PipelineError::EmbeddingService(e.to_string()));
                continue;
            }
        }
    }

    Err(last_err.unwrap_or_else(|| {
        PipelineError::EmbeddingService("embedding failed after retries".to_string())
    }))
}

/// Embed a single question for retrieval.
pub async fn embed_query(config: &EmbeddingConfig, text: &str) -> Result<Vec<f32>, PipelineError> {
    let results = embed_texts(config, &[text.to_string()]).await?;
    results
        .into_iter()
        .next()
        .ok_or_else(|| PipelineError::EmbeddingService("empty embedding response".to_string()))
}

/// Parse a `batchEmbedContents` response, extracting `embeddings[].values`.
fn parse_embed_response(json: &serde_json::Value) -> Result<Vec<Vec<f32>>, PipelineError> {
    let embeddings = json
        .get("embeddings")
        .and_then(|e| e.as_array())
        .ok_or_else(|| {
            PipelineError::EmbeddingService(
                "invalid Gemini response: missing embeddings array".to_string(),
            )
        })?;

    let mut vectors = Vec::with_capacity(embeddings.len());

    for item in embeddings {
        let values = item.get("values").and_then(|v| v.as_array()).ok_or_else(|| {
            PipelineError::EmbeddingService("invalid Gemini response: missing values".to_string())
        })?;

        let vec: Vec<f32> = values
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();
        vectors.push(vec);
    }

    Ok(vectors)
}

/// Encode a float vector as a BLOB (little-endian f32 bytes) for SQLite
/// storage.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for &v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode a BLOB back into a float vector.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Cosine similarity between two vectors, in `[-1.0, 1.0]`. Returns `0.0`
/// for empty or mismatched-length vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}
