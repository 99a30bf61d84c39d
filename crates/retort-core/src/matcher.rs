//! Matching engine: embed a query, scan every stored vector, pick the
//! extremum under the configured policy, resolve the sentence to an answer.
//!
//! Linear scan is deliberate at this corpus size. Swapping in an approximate
//! nearest-neighbor index would change this module, not its contract.

use serde::{Deserialize, Serialize};

use crate::corpus::{lookup_answer, CorpusEntry};
use crate::ollama::{EmbedError, Embedder};
use crate::store::{StoreError, VectorStore};

/// Which end of the distance range a query selects.
///
/// `Nearest` picks the closest stored vector, which is what "most similar"
/// means under Euclidean distance. `Farthest` picks the opposite end and is
/// kept as an explicit choice because the system this replaces behaved that
/// way; it is not the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    #[default]
    Nearest,
    Farthest,
}

/// The outcome of one query. `answer` is `None` when the matched sentence has
/// no corpus entry; callers must treat that as distinct from a real answer.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub matched_sentence: String,
    pub distance: f32,
    pub answer: Option<String>,
}

/// Embeds `message` and matches it against every stored vector.
///
/// Fails with [`MatchError::NoEmbeddings`] on an empty store (the expected
/// pre-ingestion state) and [`MatchError::DimensionMismatch`] when any stored
/// vector disagrees with the query dimensionality. Ties on the extremal
/// distance keep the first record in store read order.
pub async fn find_match<E: Embedder>(
    message: &str,
    embedder: &E,
    store: &VectorStore,
    entries: &[CorpusEntry],
    policy: SelectionPolicy,
) -> Result<MatchResult, MatchError> {
    let query = embedder.embed(message).await?;
    let mut records = store.read_all()?;
    if records.is_empty() {
        return Err(MatchError::NoEmbeddings);
    }

    let mut distances = Vec::with_capacity(records.len());
    for record in &records {
        if record.vector.len() != query.len() {
            return Err(MatchError::DimensionMismatch {
                expected: query.len(),
                found: record.vector.len(),
            });
        }
        distances.push(euclidean_distance(&query, &record.vector));
    }

    // Strict comparison keeps the first extremum on ties.
    let mut best = 0;
    for (i, &d) in distances.iter().enumerate().skip(1) {
        let better = match policy {
            SelectionPolicy::Nearest => d < distances[best],
            SelectionPolicy::Farthest => d > distances[best],
        };
        if better {
            best = i;
        }
    }

    let distance = distances[best];
    let record = records.swap_remove(best);
    let answer = lookup_answer(entries, &record.sentence).map(str::to_string);
    Ok(MatchResult {
        matched_sentence: record.sentence,
        distance,
        answer,
    })
}

/// Straight-line distance between two vectors of equal length.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("embedding error: {0}")]
    Embed(#[from] EmbedError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("no embeddings in store; run ingestion first")]
    NoEmbeddings,
    #[error("query vector has {expected} dimension(s) but a stored vector has {found}")]
    DimensionMismatch { expected: usize, found: usize },
}
