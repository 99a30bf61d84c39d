//! Ingestion pipeline: flatten corpus questions → embed → append to the store.
//! Runs offline, before the bot serves queries.

use crate::corpus::{flatten_questions, CorpusEntry};
use crate::ollama::{EmbedError, Embedder};
use crate::store::{EmbeddingRecord, StoreError, VectorStore};

/// Embeds every corpus question in one batch call and appends the
/// (question, vector) pairs to the store in corpus order.
/// Returns the number of records written.
///
/// Not idempotent: running twice against the same store doubles every record.
/// Clear the store first if that matters.
pub async fn ingest<E: Embedder>(
    entries: &[CorpusEntry],
    embedder: &E,
    store: &VectorStore,
) -> Result<usize, IngestError> {
    let questions = flatten_questions(entries);
    if questions.is_empty() {
        return Ok(0);
    }

    let vectors = embedder.embed_batch(&questions).await?;
    if vectors.len() != questions.len() {
        return Err(IngestError::EmbeddingCount {
            expected: questions.len(),
            got: vectors.len(),
        });
    }

    let records: Vec<EmbeddingRecord> = questions
        .into_iter()
        .zip(vectors)
        .map(|(sentence, vector)| EmbeddingRecord { sentence, vector })
        .collect();
    store.append_batch(&records)?;
    Ok(records.len())
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("embedding error: {0}")]
    Embed(#[from] EmbedError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("model returned {got} embedding(s) for {expected} question(s)")]
    EmbeddingCount { expected: usize, got: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ollama::testing::StaticEmbedder;

    fn corpus() -> Vec<CorpusEntry> {
        vec![
            CorpusEntry {
                user_questions: vec!["hi".into(), "hello".into()],
                possible_answers: vec!["Hey!".into(), "Hey!".into()],
            },
            CorpusEntry {
                user_questions: vec!["bye".into()],
                possible_answers: vec!["See you!".into()],
            },
        ]
    }

    fn embedder() -> StaticEmbedder {
        StaticEmbedder::new(&[
            ("hi", &[1.0, 0.0]),
            ("hello", &[0.9, 0.1]),
            ("bye", &[0.0, 1.0]),
        ])
    }

    #[tokio::test]
    async fn writes_all_questions_in_corpus_order() {
        let store = VectorStore::open_in_memory().unwrap();
        let written = ingest(&corpus(), &embedder(), &store).await.unwrap();
        assert_eq!(written, 3);

        let records = store.read_all().unwrap();
        let sentences: Vec<&str> = records.iter().map(|r| r.sentence.as_str()).collect();
        assert_eq!(sentences, vec!["hi", "hello", "bye"]);
        assert_eq!(records[0].vector, vec![1.0, 0.0]);
    }

    #[tokio::test]
    async fn reingestion_doubles_the_store() {
        let store = VectorStore::open_in_memory().unwrap();
        ingest(&corpus(), &embedder(), &store).await.unwrap();
        ingest(&corpus(), &embedder(), &store).await.unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 6);
        let (first, second) = records.split_at(3);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn empty_corpus_writes_nothing() {
        let store = VectorStore::open_in_memory().unwrap();
        let written = ingest(&[], &embedder(), &store).await.unwrap();
        assert_eq!(written, 0);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn embedding_count_mismatch_is_fatal() {
        struct ShortEmbedder;
        impl Embedder for ShortEmbedder {
            async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
                Ok(vec![1.0])
            }
            async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
                Ok(vec![vec![1.0]])
            }
        }

        let store = VectorStore::open_in_memory().unwrap();
        let err = ingest(&corpus(), &ShortEmbedder, &store).await.unwrap_err();
        match err {
            IngestError::EmbeddingCount { expected: 3, got: 1 } => {}
            other => panic!("unexpected error: {other}"),
        }
        // Nothing is written on failure.
        assert_eq!(store.count().unwrap(), 0);
    }
}
