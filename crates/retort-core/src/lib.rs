//! All backend logic independent of how the bot is run (CLI or a web API).
//!
//! The Q&A corpus lives in a JSON file the user points at. Retort stores only
//! config and the embeddings database in its own app data directory (see
//! [app_data]).

pub mod app_data;
pub mod chat;
pub mod config;
pub mod corpus;
pub mod ingest;
pub mod matcher;
pub mod ollama;
pub mod store;

pub use app_data::app_data_dir;
pub use chat::{answer, ChatError, ChatRequest, ChatResponse, NO_ANSWER_REPLY};
pub use config::{load_config, save_config, Config, ConfigError};
pub use corpus::{flatten_questions, load_corpus, lookup_answer, CorpusEntry, CorpusError};
pub use ingest::{ingest, IngestError};
pub use matcher::{find_match, MatchError, MatchResult, SelectionPolicy};
pub use ollama::{EmbedError, Embedder, OllamaClient};
pub use store::{EmbeddingRecord, StoreError, VectorStore};

/// Returns a short status string. Used to verify the backend is wired up.
pub fn status() -> &'static str {
    "retort-core ready"
}
