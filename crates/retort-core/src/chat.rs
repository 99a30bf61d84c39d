//! The request/response seam a transport layer (CLI, HTTP) calls.
//! Validates the request before any embedding or store access happens.

use serde::{Deserialize, Serialize};

use crate::corpus::CorpusEntry;
use crate::matcher::{find_match, MatchError, SelectionPolicy};
use crate::ollama::Embedder;
use crate::store::VectorStore;

/// Reply used when the matched sentence has no corpus entry. Fixed so callers
/// can tell it apart from authored answers.
pub const NO_ANSWER_REPLY: &str = "No answer found.";

/// Incoming chat request. `message` is optional at the serde level so a
/// missing field becomes a validation error instead of a parse failure.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub distance: f32,
}

/// Answers one chat request: validate, match, resolve.
pub async fn answer<E: Embedder>(
    request: &ChatRequest,
    embedder: &E,
    store: &VectorStore,
    entries: &[CorpusEntry],
    policy: SelectionPolicy,
) -> Result<ChatResponse, ChatError> {
    let message = request
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or(ChatError::MissingMessage)?;

    let result = find_match(message, embedder, store, entries, policy).await?;
    let response = result
        .answer
        .unwrap_or_else(|| NO_ANSWER_REPLY.to_string());
    Ok(ChatResponse {
        response,
        distance: result.distance,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("request is missing a message")]
    MissingMessage,
    #[error("matching failed: {0}")]
    Match(#[from] MatchError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::ingest;
    use crate::ollama::testing::StaticEmbedder;
    use crate::ollama::EmbedError;

    fn corpus() -> Vec<CorpusEntry> {
        vec![CorpusEntry {
            user_questions: vec!["hi".into(), "hello".into()],
            possible_answers: vec!["Hey!".into(), "Hey!".into()],
        }]
    }

    /// Embedder that fails the test if it is ever reached.
    struct UnreachableEmbedder;
    impl Embedder for UnreachableEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
            panic!("embedder must not be called for a malformed request");
        }
        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
            panic!("embedder must not be called for a malformed request");
        }
    }

    #[tokio::test]
    async fn missing_message_is_rejected_before_embedding() {
        let store = VectorStore::open_in_memory().unwrap();
        let request = ChatRequest { message: None };
        let err = answer(&request, &UnreachableEmbedder, &store, &corpus(), SelectionPolicy::Nearest)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::MissingMessage));
    }

    #[tokio::test]
    async fn blank_message_is_rejected() {
        let store = VectorStore::open_in_memory().unwrap();
        let request = ChatRequest { message: Some("   ".into()) };
        let err = answer(&request, &UnreachableEmbedder, &store, &corpus(), SelectionPolicy::Nearest)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::MissingMessage));
    }

    #[tokio::test]
    async fn empty_store_surfaces_as_no_embeddings() {
        let store = VectorStore::open_in_memory().unwrap();
        let embedder = StaticEmbedder::new(&[("hi", &[1.0, 0.0])]);
        let request = ChatRequest { message: Some("hi".into()) };
        let err = answer(&request, &embedder, &store, &corpus(), SelectionPolicy::Nearest)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Match(MatchError::NoEmbeddings)));
    }

    #[tokio::test]
    async fn ingest_then_ask_round_trip() {
        let store = VectorStore::open_in_memory().unwrap();
        let embedder = StaticEmbedder::new(&[("hi", &[1.0, 0.0]), ("hello", &[0.9, 0.1])]);
        let written = ingest(&corpus(), &embedder, &store).await.unwrap();
        assert_eq!(written, 2);

        let request = ChatRequest { message: Some("hi".into()) };
        let response = answer(&request, &embedder, &store, &corpus(), SelectionPolicy::Nearest)
            .await
            .unwrap();
        assert_eq!(response.response, "Hey!");
        assert_eq!(response.distance, 0.0);
    }

    #[tokio::test]
    async fn unmatched_sentence_gets_the_fallback_reply() {
        let store = VectorStore::open_in_memory().unwrap();
        store.append("orphan", &[1.0, 0.0]).unwrap();
        let embedder = StaticEmbedder::new(&[("hi", &[1.0, 0.0])]);
        let request = ChatRequest { message: Some("hi".into()) };
        let response = answer(&request, &embedder, &store, &corpus(), SelectionPolicy::Nearest)
            .await
            .unwrap();
        assert_eq!(response.response, NO_ANSWER_REPLY);
    }

    #[test]
    fn request_parses_with_and_without_message() {
        let with: ChatRequest = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert_eq!(with.message.as_deref(), Some("hi"));
        let without: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(without.message.is_none());
    }
}
