//! Core data models used throughout the pipelines.
//!
//! These types represent the documents, chunks, conversation turns, and
//! search results that flow through ingestion and retrieval.

use chrono::{DateTime, Utc};

/// A raw document produced by the loader. Identity is the `name`; the
/// document itself is never persisted, only its derived chunks.
#[derive(Debug, Clone)]
pub struct Document {
    pub content: String,
    pub name: String,
}

/// A bounded window of a document's text, tagged with source identity.
///
/// The `chunk_id` is deterministic per `(source, index)` so re-ingestion
/// produces identical ids. The embedding is absent until the embedding
/// provider returns a new chunk via [`with_embedding`](DocumentChunk::with_embedding);
/// chunks are never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentChunk {
    pub text: String,
    pub source: String,
    pub chunk_id: String,
    pub embedding: Option<Vec<f32>>,
}

impl DocumentChunk {
    /// Create an un-embedded chunk with the `"{source}_chunk_{index}"` id.
    pub fn new(text: impl Into<String>, source: impl Into<String>, index: usize) -> Self {
        let source = source.into();
        let chunk_id = format!("{}_chunk_{}", source, index);
        Self {
            text: text.into(),
            source,
            chunk_id,
            embedding: None,
        }
    }

    /// Return a copy of this chunk with the embedding populated.
    pub fn with_embedding(self, embedding: Vec<f32>) -> Self {
        Self {
            embedding: Some(embedding),
            ..self
        }
    }
}

/// One user message plus the generated reply, the atomic unit of history.
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub user_id: String,
    pub user_msg: String,
    pub bot_msg: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(
        user_id: impl Into<String>,
        user_msg: impl Into<String>,
        bot_msg: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            user_msg: user_msg.into(),
            bot_msg: bot_msg.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A similarity search hit, nearest-first. Ephemeral per query.
#[derive(Debug, Clone)]
pub struct SimilarMatch {
    pub text: String,
    pub source: Option<String>,
    pub score: f32,
}
