//! Query orchestration: the retrieval-augmented generation pipeline.
//!
//! Per request: fetch recent history, embed the query, retrieve the
//! nearest chunks, assemble the prompt, invoke generation, persist the new
//! turn, return the answer. There are no retries; any stage failure
//! propagates immediately and the turn is not recorded.

use std::sync::Arc;
use tracing::info;

use crate::embedding::EmbeddingProvider;
use crate::error::{Error, Result};
use crate::generation::GenerationProvider;
use crate::history::HistoryStore;
use crate::models::ConversationTurn;
use crate::vector_store::VectorStore;

/// Nearest chunks retrieved per query.
const TOP_N: usize = 5;

/// Token budget passed to the generation provider.
const MAX_TOKENS: u32 = 500;

/// Rendered in place of `{history}` when the user has no prior turns.
const EMPTY_HISTORY_MARKER: &str = "No hay historial previo";

/// The prompt template. The placeholder substitution (and the template
/// text itself) must stay byte-for-byte stable; downstream compatibility
/// tests compare assembled prompts literally.
const SYSTEM_PROMPT: &str = "You are an expert assistant that answers questions based on the provided context.If the answer is not in the context, clearly state that you do not have that information.\n\nContext:\n{context}\n\nConversation History:\n{history}\n\nInstruction: Answer the following question concisely and precisely: {user_query}";

/// Orchestrates history → retrieval → prompt → generation → persistence.
pub struct RagPipeline {
    history: Arc<dyn HistoryStore>,
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn GenerationProvider>,
}

impl RagPipeline {
    pub fn new(
        history: Arc<dyn HistoryStore>,
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn GenerationProvider>,
    ) -> Self {
        Self {
            history,
            vector_store,
            embedder,
            generator,
        }
    }

    /// Answer a user query. Never returns an empty answer on success; the
    /// turn is persisted only after generation succeeds.
    pub async fn answer(&self, user_id: &str, user_query: &str) -> Result<String> {
        info!(user_id, "answering query");

        let turns = self.history.recent(user_id).await?;
        let history = render_history(&turns);

        let context = self.relevant_context(user_query).await?;

        let prompt = build_prompt(user_query, &context.join("\n"), &history);

        let response = self.generator.generate(&prompt, MAX_TOKENS).await?;

        self.history
            .append(&ConversationTurn::new(user_id, user_query, &response))
            .await?;

        Ok(response)
    }

    /// Embed the query and fetch the nearest chunk texts. Empty retrieval
    /// is not an error; it yields an empty context.
    async fn relevant_context(&self, user_query: &str) -> Result<Vec<String>> {
        let query_embedding = self
            .embedder
            .embed_text(user_query)
            .await
            .map_err(into_retrieval)?;

        let matches = self
            .vector_store
            .search_similar(&query_embedding, TOP_N, None)
            .await
            .map_err(into_retrieval)?;

        if matches.is_empty() {
            info!("no documents found for the query");
        }
        Ok(matches.into_iter().map(|m| m.text).collect())
    }
}

fn into_retrieval(e: Error) -> Error {
    match e {
        Error::Retrieval(msg) => Error::Retrieval(msg),
        other => Error::Retrieval(other.to_string()),
    }
}

/// Render turns oldest-first as alternating `User:`/`Bot:` lines. The
/// store returns newest-first, so the order is reversed here.
fn render_history(turns: &[ConversationTurn]) -> String {
    turns
        .iter()
        .rev()
        .map(|turn| format!("User: {}\nBot: {}", turn.user_msg, turn.bot_msg))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Substitute context, history, and query into the prompt template.
fn build_prompt(user_query: &str, context: &str, history: &str) -> String {
    let history = if history.is_empty() {
        EMPTY_HISTORY_MARKER
    } else {
        history
    };
    SYSTEM_PROMPT
        .replace("{context}", context)
        .replace("{history}", history)
        .replace("{user_query}", user_query)
}
