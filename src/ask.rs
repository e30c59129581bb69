//! Question answering: retrieval plus grounded generation.
//!
//! `retrieve` loads the persisted index, embeds the question with the same
//! model that built the index, and returns the top-matching chunks. `run_ask`
//! forwards them to the answerer; `run_chat` does the same in a loop while
//! maintaining an append-only session transcript.

use anyhow::Result;
use std::io::{BufRead, Write};

use crate::answer;
use crate::config::Config;
use crate::embedding;
use crate::error::PipelineError;
use crate::index;
use crate::models::{ScoredChunk, Transcript};

/// Return the `k` chunks most similar to `question` from the persisted index.
///
/// # Errors
///
/// - [`PipelineError::IndexNotFound`] when no document has been processed.
/// - [`PipelineError::Config`] when the configured embedding model differs
///   from the one recorded in the index (mixed models make similarity
///   meaningless).
/// - [`PipelineError::EmbeddingService`] when embedding the question fails.
pub async fn retrieve(
    config: &Config,
    question: &str,
    k: usize,
) -> Result<Vec<ScoredChunk>, PipelineError> {
    let meta = index::read_meta(&config.index.path).await?;

    if meta.model != config.embedding.model {
        return Err(PipelineError::Config(format!(
            "index was built with embedding model '{}' but config requests '{}'; \
             re-run process to rebuild the index",
            meta.model, config.embedding.model
        )));
    }

    let query_vec = embedding::embed_query(&config.embedding, question).await?;

    if query_vec.len() != meta.dims {
        return Err(PipelineError::Config(format!(
            "question embedding has {} dims, index expects {}",
            query_vec.len(),
            meta.dims
        )));
    }

    index::top_chunks(&config.index.path, &query_vec, k).await
}

pub async fn run_ask(config: &Config, question: &str, top_k: Option<usize>) -> Result<()> {
    if question.trim().is_empty() {
        println!("Empty question.");
        return Ok(());
    }

    let reply = ask_once(config, question, top_k).await?;
    println!("{}", reply);
    Ok(())
}

/// One full question pipeline: retrieve then answer.
async fn ask_once(config: &Config, question: &str, top_k: Option<usize>) -> Result<String> {
    let k = top_k.unwrap_or(config.retrieval.top_k);
    let hits = retrieve(config, question, k).await?;
    let context: Vec<String> = hits.into_iter().map(|c| c.text).collect();
    let reply = answer::answer(&config.generation, question, &context).await?;
    Ok(reply)
}

/// Interactive question loop over stdin.
///
/// Keeps a session-scoped append-only transcript. A failed turn is reported
/// on stderr and recorded nowhere; prior turns and the persisted index stay
/// intact and the loop continues.
pub async fn run_chat(config: &Config) -> Result<()> {
    let stdin = std::io::stdin();
    let mut transcript = Transcript::new();

    println!("Ask questions about the processed document. Type 'exit' to quit,");
    println!("'history' to reprint the conversation.");

    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let question = line.trim();

        if question.is_empty() {
            continue;
        }
        if question == "exit" || question == "quit" {
            break;
        }
        if question == "history" {
            render_transcript(&transcript);
            continue;
        }

        match ask_once(config, question, None).await {
            Ok(reply) => {
                transcript.push_user(question);
                transcript.push_assistant(&reply);
                println!("assistant> {}", reply);
            }
            Err(e) => {
                eprintln!("error: {}", e);
            }
        }
    }

    Ok(())
}

/// Print every turn of the transcript, role-tagged, oldest first.
fn render_transcript(transcript: &Transcript) {
    if transcript.is_empty() {
        println!("(no turns yet)");
        return;
    }
    for turn in transcript.turns() {
        println!("{}: {}", turn.role.as_str(), turn.content);
    }
}
