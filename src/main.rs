//! # docqa CLI
//!
//! Command-line interface for the document question-answering pipeline.
//!
//! ## Usage
//!
//! ```bash
//! docqa --config ./config/docqa.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docqa docs` | List registered documents and index status |
//! | `docqa process <document>` | Extract, chunk, embed, and index a document |
//! | `docqa ask "<question>"` | Answer one question from the indexed document |
//! | `docqa chat` | Interactive question loop with a session transcript |
//! | `docqa status` | Show persisted index metadata |

mod answer;
mod ask;
mod chunk;
mod config;
mod docs;
mod embedding;
mod error;
mod index;
mod loader;
mod models;
mod process;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docqa — retrieval-augmented question answering over pre-registered
/// documents.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file with the document registry, index location, chunking parameters,
/// and model settings. The Gemini API key is read from the GEMINI_API_KEY
/// environment variable.
#[derive(Parser)]
#[command(
    name = "docqa",
    about = "docqa — retrieval-augmented question answering over pre-registered documents",
    version,
    long_about = "docqa extracts a registered document's text, chunks and embeds it into a \
    persisted vector index, and answers questions by retrieving the most similar chunks and \
    forwarding them inside a grounded prompt to a Gemini generative model."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/docqa.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// List registered documents and whether one is currently indexed.
    Docs,

    /// Process a registered document: extract its text, chunk it, embed the
    /// chunks, and replace the persisted vector index.
    Process {
        /// Registered document name (a key in the [documents] table).
        document: String,
    },

    /// Answer one question from the currently indexed document.
    Ask {
        /// The question to answer.
        question: String,

        /// Number of chunks to retrieve as context (defaults to
        /// retrieval.top_k from config).
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Interactive question loop maintaining a session transcript.
    Chat,

    /// Show metadata of the persisted index.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Docs => {
            docs::run_docs(&cfg).await?;
        }
        Commands::Process { document } => {
            process::run_process(&cfg, &document).await?;
        }
        Commands::Ask { question, top_k } => {
            ask::run_ask(&cfg, &question, top_k).await?;
        }
        Commands::Chat => {
            ask::run_chat(&cfg).await?;
        }
        Commands::Status => {
            docs::run_status(&cfg).await?;
        }
    }

    Ok(())
}
