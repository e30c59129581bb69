//! Registry listing and index status reporting.

use anyhow::Result;

use crate::config::Config;
use crate::error::PipelineError;
use crate::index;

/// List registered documents and which one, if any, is currently indexed.
pub async fn run_docs(config: &Config) -> Result<()> {
    let indexed = match index::read_meta(&config.index.path).await {
        Ok(meta) => Some(meta.document),
        Err(PipelineError::IndexNotFound(_)) => None,
        Err(e) => return Err(e.into()),
    };

    println!("{:<24} {:<10} PATH", "DOCUMENT", "STATUS");
    for (name, path) in &config.documents {
        let status = if Some(name) == indexed.as_ref() {
            "indexed"
        } else if path.is_file() {
            "ready"
        } else {
            "missing"
        };
        println!("{:<24} {:<10} {}", name, status, path.display());
    }

    Ok(())
}

/// Print the persisted index metadata, or a hint when nothing has been
/// processed yet.
pub async fn run_status(config: &Config) -> Result<()> {
    match index::read_meta(&config.index.path).await {
        Ok(meta) => {
            let built = chrono::DateTime::from_timestamp(meta.built_at, 0)
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_default();

            println!("index: {}", config.index.path.display());
            println!("  document: {}", meta.document);
            println!("  embedding model: {}", meta.model);
            println!("  dims: {}", meta.dims);
            println!("  chunks: {}", meta.chunk_count);
            println!("  source hash: {}", meta.source_hash);
            println!("  built: {}", built);
        }
        Err(PipelineError::IndexNotFound(_)) => {
            println!("No index. Run `docqa process <document>` first.");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
