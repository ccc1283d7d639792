//! Embedding provider abstraction and local implementation.
//!
//! Defines the [`EmbeddingProvider`] trait and the fastembed-backed
//! [`FastembedProvider`] (enabled by the `local-embeddings` feature; models
//! are downloaded on first use and cached, after which no network calls are
//! needed).
//!
//! The trait's single required operation is [`embed_texts`](EmbeddingProvider::embed_texts);
//! `embed_text`, `embed_chunk`, and `embed_batch` are provided on top of it,
//! so batch embedding is element-wise equivalent to embedding each text
//! individually for every implementation.

use async_trait::async_trait;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};
use crate::models::DocumentChunk;

/// Maps text to fixed-dimension vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"sentence-transformers/all-MiniLM-L6-v2"`).
    fn model_name(&self) -> &str;

    /// Returns the embedding vector dimensionality (e.g. `384`).
    fn dims(&self) -> usize;

    /// Embed a batch of texts, one vector per input, in input order.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text (e.g. a search query).
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text.to_string()];
        let mut vectors = self.embed_texts(&texts).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::Retrieval("empty embedding response".to_string()))
    }

    /// Embed one chunk, returning a new chunk with the embedding populated.
    async fn embed_chunk(&self, chunk: DocumentChunk) -> Result<DocumentChunk> {
        let embedding = self.embed_text(&chunk.text).await?;
        Ok(chunk.with_embedding(embedding))
    }

    /// Embed a batch of chunks, returning new chunks in input order.
    async fn embed_batch(&self, chunks: Vec<DocumentChunk>) -> Result<Vec<DocumentChunk>> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embed_texts(&texts).await?;
        if vectors.len() != chunks.len() {
            return Err(Error::Retrieval(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                vectors.len()
            )));
        }
        Ok(chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| chunk.with_embedding(vector))
            .collect())
    }
}

/// Create the embedding provider for the configured model.
pub fn create_provider(config: &EmbeddingConfig) -> Result<std::sync::Arc<dyn EmbeddingProvider>> {
    #[cfg(feature = "local-embeddings")]
    {
        Ok(std::sync::Arc::new(FastembedProvider::new(
            &config.model_name,
        )?))
    }
    #[cfg(not(feature = "local-embeddings"))]
    {
        let _ = config;
        Err(Error::Validation(
            "built without the local-embeddings feature; no embedding provider available"
                .to_string(),
        ))
    }
}

// ============ Fastembed Provider ============

/// Local embedding inference via fastembed.
///
/// The underlying model is initialized once at construction (downloading on
/// first use) and shared behind a mutex; inference runs on the blocking
/// thread pool.
#[cfg(feature = "local-embeddings")]
pub struct FastembedProvider {
    model_name: String,
    dims: usize,
    model: std::sync::Arc<std::sync::Mutex<fastembed::TextEmbedding>>,
}

#[cfg(feature = "local-embeddings")]
impl FastembedProvider {
    pub fn new(model_name: &str) -> Result<Self> {
        let fastembed_model = resolve_model(model_name)?;
        let dims = model_dims(&fastembed_model);

        let model = fastembed::TextEmbedding::try_new(
            fastembed::InitOptions::new(fastembed_model).with_show_download_progress(false),
        )
        .map_err(|e| Error::Connection(format!("failed to initialize embedding model: {}", e)))?;

        Ok(Self {
            model_name: model_name.to_string(),
            dims,
            model: std::sync::Arc::new(std::sync::Mutex::new(model)),
        })
    }
}

#[cfg(feature = "local-embeddings")]
#[async_trait]
impl EmbeddingProvider for FastembedProvider {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = std::sync::Arc::clone(&self.model);
        let texts = texts.to_vec();
        tokio::task::spawn_blocking(move || {
            let mut guard = model
                .lock()
                .map_err(|_| Error::Retrieval("embedding model lock poisoned".to_string()))?;
            guard
                .embed(texts, None)
                .map_err(|e| Error::Retrieval(format!("embedding failed: {}", e)))
        })
        .await
        .map_err(|e| Error::Retrieval(format!("embedding task failed: {}", e)))?
    }
}

/// Map a configured model name (Hugging Face id or short form) to the
/// fastembed model it runs as.
#[cfg(feature = "local-embeddings")]
fn resolve_model(name: &str) -> Result<fastembed::EmbeddingModel> {
    match name {
        "sentence-transformers/all-MiniLM-L6-v2" | "all-minilm-l6-v2" => {
            Ok(fastembed::EmbeddingModel::AllMiniLML6V2)
        }
        "BAAI/bge-small-en-v1.5" | "bge-small-en-v1.5" => {
            Ok(fastembed::EmbeddingModel::BGESmallENV15)
        }
        "BAAI/bge-base-en-v1.5" | "bge-base-en-v1.5" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
        "nomic-ai/nomic-embed-text-v1.5" | "nomic-embed-text-v1.5" => {
            Ok(fastembed::EmbeddingModel::NomicEmbedTextV15)
        }
        "intfloat/multilingual-e5-small" | "multilingual-e5-small" => {
            Ok(fastembed::EmbeddingModel::MultilingualE5Small)
        }
        other => Err(Error::Validation(format!(
            "Unknown embedding model: '{}'. Supported models: \
             sentence-transformers/all-MiniLM-L6-v2, bge-small-en-v1.5, bge-base-en-v1.5, \
             nomic-embed-text-v1.5, multilingual-e5-small",
            other
        ))),
    }
}

#[cfg(feature = "local-embeddings")]
fn model_dims(model: &fastembed::EmbeddingModel) -> usize {
    match model {
        fastembed::EmbeddingModel::BGEBaseENV15 | fastembed::EmbeddingModel::NomicEmbedTextV15 => {
            768
        }
        _ => 384,
    }
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns `0.0` for empty vectors or vectors of different lengths.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}
