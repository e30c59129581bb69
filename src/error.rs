//! Pipeline error kinds.
//!
//! Every pipeline step surfaces its failure to the caller as one of these
//! variants; nothing is swallowed and nothing is retried here (the embedding
//! client owns the only transient-retry policy).

use std::path::PathBuf;

#[derive(Debug)]
pub enum PipelineError {
    /// The document name is not registered, or its file is missing/unreadable.
    DocumentNotFound(String),
    /// No persisted index exists yet at the configured path.
    IndexNotFound(PathBuf),
    /// The source file exists but its text could not be extracted.
    Extraction(String),
    /// Invalid configuration (chunking parameters, missing credential, model mismatch).
    Config(String),
    /// The remote embedding service failed.
    EmbeddingService(String),
    /// The remote generative model failed.
    GenerationService(String),
    /// Index storage I/O failed.
    Storage(String),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::DocumentNotFound(name) => {
                write!(f, "document not found: {}", name)
            }
            PipelineError::IndexNotFound(path) => {
                write!(
                    f,
                    "index not found at {} (no document has been processed)",
                    path.display()
                )
            }
            PipelineError::Extraction(e) => write!(f, "text extraction failed: {}", e),
            PipelineError::Config(e) => write!(f, "configuration error: {}", e),
            PipelineError::EmbeddingService(e) => write!(f, "embedding service error: {}", e),
            PipelineError::GenerationService(e) => write!(f, "generation service error: {}", e),
            PipelineError::Storage(e) => write!(f, "index storage error: {}", e),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<sqlx::Error> for PipelineError {
    fn from(e: sqlx::Error) -> Self {
        PipelineError::Storage(e.to_string())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        PipelineError::Storage(e.to_string())
    }
}
