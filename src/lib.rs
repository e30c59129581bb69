//! # docqa
//!
//! A retrieval-augmented question-answering CLI for pre-registered documents.
//!
//! docqa extracts the text of a registered document, splits it into
//! overlapping chunks, embeds the chunks with the Gemini embedding API, and
//! persists a single-document vector index. Questions are answered by
//! embedding the question with the same model, retrieving the top-matching
//! chunks by cosine similarity, and forwarding them inside a grounded prompt
//! to a Gemini generative model.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────┐   ┌──────────────┐
//! │  Loader  │──▶│ Chunker │──▶│   Indexer     │   process <document>
//! │ PDF/text │   │ overlap │   │ embed+persist │
//! └──────────┘   └─────────┘   └──────┬───────┘
//!                                     │ index.db (replaced atomically)
//!                              ┌──────▼───────┐   ┌──────────┐
//!                              │  Retriever    │──▶│ Answerer │   ask / chat
//!                              │ top-k cosine  │   │ grounded │
//!                              └──────────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export GEMINI_API_KEY=...
//! docqa docs                      # list registered documents
//! docqa process chapter1         # build the vector index
//! docqa ask "When did the revolution begin?"
//! docqa chat                     # interactive session
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`error`] | Typed pipeline errors |
//! | [`models`] | Core data types and the chat transcript |
//! | [`loader`] | Document registry lookup and text extraction |
//! | [`chunk`] | Overlapping text chunking |
//! | [`embedding`] | Gemini embedding client and vector utilities |
//! | [`index`] | Persisted vector index (SQLite, atomic replace) |
//! | [`answer`] | Grounded prompt construction and generation |
//! | [`process`] | Indexing pipeline orchestration |
//! | [`ask`] | Retrieval, single questions, and the chat loop |
//! | [`docs`] | Registry listing and index status |

pub mod answer;
pub mod ask;
pub mod chunk;
pub mod config;
pub mod docs;
pub mod embedding;
pub mod error;
pub mod index;
pub mod loader;
pub mod models;
pub mod process;
