//! Integration tests driving the docqa binary.
//!
//! Everything here runs offline: every scenario fails or completes before a
//! remote call would be made (unknown document, missing index, missing
//! credential, invalid config), which is exactly the error surface the CLI
//! must report cleanly.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn docqa_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("docqa");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    fs::create_dir_all(root.join("config")).unwrap();
    fs::create_dir_all(root.join("data")).unwrap();
    let docs_dir = root.join("chapters");
    fs::create_dir_all(&docs_dir).unwrap();

    fs::write(
        docs_dir.join("chapter1.txt"),
        "The revolution began in 1789 and ended in 1799.\n\nIt reshaped the country.",
    )
    .unwrap();
    fs::write(docs_dir.join("broken.pdf"), b"not a real pdf").unwrap();

    let config_content = format!(
        r#"[documents]
"chapter1" = "{root}/chapters/chapter1.txt"
"broken" = "{root}/chapters/broken.pdf"
"ghost" = "{root}/chapters/ghost.txt"

[index]
path = "{root}/data/index.db"

[chunking]
max_chars = 200
overlap_chars = 20
"#,
        root = root.display()
    );

    let config_path = root.join("config").join("docqa.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_docqa(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = docqa_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("GEMINI_API_KEY")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run docqa binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_docs_lists_registered_documents() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_docqa(&config_path, &["docs"]);
    assert!(success, "docs failed: {}", stderr);
    assert!(stdout.contains("chapter1"));
    assert!(stdout.contains("ready"));
    assert!(stdout.contains("ghost"));
    assert!(stdout.contains("missing"));
}

#[test]
fn test_status_without_index() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_docqa(&config_path, &["status"]);
    assert!(success, "status should succeed with no index");
    assert!(stdout.contains("No index"));
}

#[test]
fn test_ask_before_process_reports_missing_index() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_docqa(&config_path, &["ask", "When did it begin?"]);
    assert!(!success, "ask without an index should fail");
    assert!(
        stderr.contains("no document has been processed"),
        "should report missing index, got: {}",
        stderr
    );
}

#[test]
fn test_ask_empty_question() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_docqa(&config_path, &["ask", "   "]);
    assert!(success, "empty question should not panic");
    assert!(stdout.contains("Empty question"));
}

#[test]
fn test_process_unknown_document() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_docqa(&config_path, &["process", "chapter99"]);
    assert!(!success, "unknown document should fail");
    assert!(
        stderr.contains("not registered"),
        "should name the missing registration, got: {}",
        stderr
    );
}

#[test]
fn test_process_missing_file() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_docqa(&config_path, &["process", "ghost"]);
    assert!(!success, "missing source file should fail");
    assert!(
        stderr.contains("document not found"),
        "should report missing file, got: {}",
        stderr
    );
}

#[test]
fn test_process_corrupt_pdf() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_docqa(&config_path, &["process", "broken"]);
    assert!(!success, "corrupt PDF should fail");
    assert!(
        stderr.contains("extraction failed"),
        "should report extraction failure, got: {}",
        stderr
    );
}

#[test]
fn test_process_without_credential() {
    let (_tmp, config_path) = setup_test_env();

    // Loading and chunking succeed; the pipeline stops at the missing key
    // before any remote call.
    let (_, stderr, success) = run_docqa(&config_path, &["process", "chapter1"]);
    assert!(!success, "process without an API key should fail");
    assert!(
        stderr.contains("GEMINI_API_KEY"),
        "should name the missing credential, got: {}",
        stderr
    );
}

#[test]
fn test_invalid_chunking_config_rejected() {
    let (tmp, _) = setup_test_env();
    let root = tmp.path();

    let bad_config = format!(
        r#"[documents]
"chapter1" = "{root}/chapters/chapter1.txt"

[index]
path = "{root}/data/index.db"

[chunking]
max_chars = 50
overlap_chars = 80
"#,
        root = root.display()
    );
    let bad_path = root.join("config").join("bad.toml");
    fs::write(&bad_path, &bad_config).unwrap();

    let (_, stderr, success) = run_docqa(&bad_path, &["docs"]);
    assert!(!success, "overlap >= max_chars must be rejected at load");
    assert!(
        stderr.contains("overlap_chars"),
        "should name the invalid setting, got: {}",
        stderr
    );
}

#[test]
fn test_failed_process_leaves_no_index_behind() {
    let (tmp, config_path) = setup_test_env();

    let (_, _, success) = run_docqa(&config_path, &["process", "chapter1"]);
    assert!(!success);

    // The pipeline failed before persisting anything; status still reports
    // no index and the data directory holds no leftover temp files.
    let (stdout, _, _) = run_docqa(&config_path, &["status"]);
    assert!(stdout.contains("No index"));

    let leftovers: Vec<_> = fs::read_dir(tmp.path().join("data"))
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert!(
        leftovers.is_empty(),
        "data dir should be empty, found: {:?}",
        leftovers
    );
}
