//! Document loading and text extraction.
//!
//! Resolves a registered document name to its source file and returns the
//! full extracted text in source order. PDF extraction is delegated to
//! `pdf-extract`; plain-text formats are read directly. No side effects.

use std::path::Path;

use crate::config::Config;
use crate::error::PipelineError;

/// Load the full extracted text of a registered document.
///
/// # Errors
///
/// - [`PipelineError::DocumentNotFound`] when the name is not registered or
///   its file is missing or unreadable.
/// - [`PipelineError::Extraction`] when the file exists but cannot be parsed
///   (corrupt or encrypted PDF, unsupported format).
pub fn load_text(config: &Config, name: &str) -> Result<String, PipelineError> {
    let path = config.documents.get(name).ok_or_else(|| {
        PipelineError::DocumentNotFound(format!("'{}' is not registered in [documents]", name))
    })?;

    if !path.is_file() {
        return Err(PipelineError::DocumentNotFound(format!(
            "'{}' points to missing file {}",
            name,
            path.display()
        )));
    }

    extract_text(path)
}

fn extract_text(path: &Path) -> Result<String, PipelineError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => pdf_extract::extract_text(path)
            .map_err(|e| PipelineError::Extraction(format!("{}: {}", path.display(), e))),
        "txt" | "md" => std::fs::read_to_string(path)
            .map_err(|e| PipelineError::DocumentNotFound(format!("{}: {}", path.display(), e))),
        other => Err(PipelineError::Extraction(format!(
            "unsupported document format '.{}' for {}",
            other,
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn config_with(docs: &[(&str, PathBuf)]) -> Config {
        let mut documents = BTreeMap::new();
        for (name, path) in docs {
            documents.insert(name.to_string(), path.clone());
        }
        Config {
            documents,
            index: crate::config::IndexConfig {
                path: PathBuf::from("./data/index.db"),
            },
            chunking: Default::default(),
            retrieval: Default::default(),
            embedding: Default::default(),
            generation: Default::default(),
        }
    }

    #[test]
    fn test_unregistered_name() {
        let config = config_with(&[]);
        let err = load_text(&config, "chapter1").unwrap_err();
        assert!(matches!(err, PipelineError::DocumentNotFound(_)));
    }

    #[test]
    fn test_missing_file() {
        let config = config_with(&[("ghost", PathBuf::from("/nonexistent/ghost.txt"))]);
        let err = load_text(&config, "ghost").unwrap_err();
        assert!(matches!(err, PipelineError::DocumentNotFound(_)));
    }

    #[test]
    fn test_plain_text_load() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("notes.txt");
        std::fs::write(&path, "The revolution began in 1789.").unwrap();

        let config = config_with(&[("notes", path)]);
        let text = load_text(&config, "notes").unwrap();
        assert_eq!(text, "The revolution began in 1789.");
    }

    #[test]
    fn test_corrupt_pdf_is_extraction_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();

        let config = config_with(&[("broken", path)]);
        let err = load_text(&config, "broken").unwrap_err();
        assert!(matches!(err, PipelineError::Extraction(_)));
    }

    #[test]
    fn test_unsupported_format() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("table.xlsx");
        std::fs::write(&path, b"irrelevant").unwrap();

        let config = config_with(&[("table", path)]);
        let err = load_text(&config, "table").unwrap_err();
        match err {
            PipelineError::Extraction(msg) => assert!(msg.contains("unsupported")),
            other => panic!("expected Extraction error, got {:?}", other),
        }
    }
}
