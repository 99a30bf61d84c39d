//! Loading and querying the Q&A corpus.
//!
//! The corpus is a JSON array of entries, each pairing paraphrased questions
//! with their answers by index. Alignment is checked once at load time so the
//! rest of the system can rely on it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One corpus entry: paraphrases of a single intent and their answers.
/// `possible_answers[i]` is the canonical answer for `user_questions[i]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub user_questions: Vec<String>,
    pub possible_answers: Vec<String>,
}

/// Loads the corpus from a JSON file. Entries whose question and answer lists
/// differ in length are rejected here, not at lookup time.
pub fn load_corpus(path: &Path) -> Result<Vec<CorpusEntry>, CorpusError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| CorpusError::Read(path.to_path_buf(), e))?;
    parse_corpus(&raw)
}

fn parse_corpus(raw: &str) -> Result<Vec<CorpusEntry>, CorpusError> {
    let entries: Vec<CorpusEntry> = serde_json::from_str(raw).map_err(CorpusError::Parse)?;
    for (i, entry) in entries.iter().enumerate() {
        if entry.user_questions.len() != entry.possible_answers.len() {
            return Err(CorpusError::Misaligned {
                entry: i,
                questions: entry.user_questions.len(),
                answers: entry.possible_answers.len(),
            });
        }
    }
    Ok(entries)
}

/// Resolves a matched sentence back to its answer: entries are scanned in
/// corpus order, questions within an entry in order, and the first hit wins.
/// Returns `None` when no entry contains the sentence.
pub fn lookup_answer<'a>(entries: &'a [CorpusEntry], sentence: &str) -> Option<&'a str> {
    for entry in entries {
        if let Some(pos) = entry.user_questions.iter().position(|q| q == sentence) {
            return entry.possible_answers.get(pos).map(String::as_str);
        }
    }
    None
}

/// Flattens all questions across the corpus into one ordered sequence:
/// corpus order, then per-entry order. Duplicates are preserved.
pub fn flatten_questions(entries: &[CorpusEntry]) -> Vec<String> {
    entries
        .iter()
        .flat_map(|e| e.user_questions.iter().cloned())
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("failed to read corpus {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("failed to parse corpus: {0}")]
    Parse(serde_json::Error),
    #[error("corpus entry {entry} has {questions} question(s) but {answers} answer(s)")]
    Misaligned {
        entry: usize,
        questions: usize,
        answers: usize,
    },
}
