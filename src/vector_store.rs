//! Vector store abstraction and Chroma implementation.
//!
//! [`ChromaStore`] talks to a remote Chroma server over its JSON HTTP API.
//! The connection is verified at construction (heartbeat, then
//! get-or-create of the collection with cosine similarity) so an
//! unreachable backend aborts startup instead of failing the first request.
//!
//! Persisted per chunk: id, embedding, text, and a `source` metadata tag
//! used for ingestion dedup ([`has_source`](VectorStore::has_source) is a
//! point lookup limited to one result, not a scan).

use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

use crate::config::VectorConfig;
use crate::error::{Error, Result};
use crate::models::{DocumentChunk, SimilarMatch};

const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Persists embedded chunks and serves similarity search.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store one embedded chunk. Fails with a validation error if the
    /// chunk has no embedding.
    async fn add_chunk(&self, chunk: &DocumentChunk) -> Result<()>;

    /// Return up to `top_n` nearest chunks by cosine similarity,
    /// nearest-first. `filter` is an optional metadata equality clause.
    async fn search_similar(
        &self,
        query_embedding: &[f32],
        top_n: usize,
        filter: Option<serde_json::Value>,
    ) -> Result<Vec<SimilarMatch>>;

    /// Whether the collection holds no chunks at all.
    async fn is_empty(&self) -> Result<bool>;

    /// Whether any chunk is tagged with this source name.
    async fn has_source(&self, name: &str) -> Result<bool>;
}

/// Chroma-backed vector store.
pub struct ChromaStore {
    base_url: String,
    collection_id: String,
    auth_token: Option<String>,
    client: reqwest::Client,
}

impl ChromaStore {
    /// Connect to the Chroma server and resolve the collection, verifying
    /// liveness before returning.
    pub async fn connect(config: &VectorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .build()
            .map_err(|e| Error::Connection(format!("failed to build HTTP client: {}", e)))?;

        let mut store = Self {
            base_url: config.base_url(),
            collection_id: String::new(),
            auth_token: (!config.auth_token.is_empty()).then(|| config.auth_token.clone()),
            client,
        };

        store.heartbeat().await?;
        store.collection_id = store.get_or_create_collection(&config.collection).await?;

        info!(
            endpoint = %store.base_url,
            collection = %config.collection,
            "vector store ready"
        );
        Ok(store)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn heartbeat(&self) -> Result<()> {
        let response = self
            .request(reqwest::Method::GET, "/api/v1/heartbeat")
            .send()
            .await
            .map_err(|e| {
                Error::Connection(format!(
                    "vector store unreachable at {}: {}",
                    self.base_url, e
                ))
            })?;

        if !response.status().is_success() {
            return Err(Error::Connection(format!(
                "vector store at {} returned {}",
                self.base_url,
                response.status()
            )));
        }
        Ok(())
    }

    async fn get_or_create_collection(&self, name: &str) -> Result<String> {
        let body = serde_json::json!({
            "name": name,
            "metadata": { "hnsw:space": "cosine" },
            "get_or_create": true,
        });

        let response = self
            .request(reqwest::Method::POST, "/api/v1/collections")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Connection(format!("failed to resolve collection: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Connection(format!(
                "collection '{}' could not be resolved ({}): {}",
                name, status, detail
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Connection(format!("invalid collection response: {}", e)))?;

        json.get("id")
            .and_then(|id| id.as_str())
            .map(|id| id.to_string())
            .ok_or_else(|| Error::Connection("collection response missing id".to_string()))
    }

    async fn collection_post(
        &self,
        op: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let path = format!("/api/v1/collections/{}/{}", self.collection_id, op);
        let response = self
            .request(reqwest::Method::POST, &path)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Store(format!("vector store {} failed: {}", op, e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Store(format!(
                "vector store {} returned {}: {}",
                op, status, detail
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Store(format!("invalid {} response: {}", op, e)))
    }
}

#[async_trait]
impl VectorStore for ChromaStore {
    async fn add_chunk(&self, chunk: &DocumentChunk) -> Result<()> {
        let embedding = chunk.embedding.as_ref().ok_or_else(|| {
            Error::Validation(format!("chunk {} has no embedding", chunk.chunk_id))
        })?;

        let body = serde_json::json!({
            "ids": [chunk.chunk_id],
            "embeddings": [embedding],
            "documents": [chunk.text],
            "metadatas": [{ "source": chunk.source }],
        });
        self.collection_post("add", &body).await?;
        Ok(())
    }

    async fn search_similar(
        &self,
        query_embedding: &[f32],
        top_n: usize,
        filter: Option<serde_json::Value>,
    ) -> Result<Vec<SimilarMatch>> {
        let mut body = serde_json::json!({
            "query_embeddings": [query_embedding],
            "n_results": top_n,
            "include": ["documents", "metadatas", "distances"],
        });
        if let Some(clause) = filter {
            body["where"] = clause;
        }

        let json = self.collection_post("query", &body).await?;
        Ok(parse_query_response(&json))
    }

    async fn is_empty(&self) -> Result<bool> {
        let path = format!("/api/v1/collections/{}/count", self.collection_id);
        let response = self
            .request(reqwest::Method::GET, &path)
            .send()
            .await
            .map_err(|e| Error::Store(format!("vector store count failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Store(format!(
                "vector store count returned {}",
                response.status()
            )));
        }

        let count: i64 = response
            .json()
            .await
            .map_err(|e| Error::Store(format!("invalid count response: {}", e)))?;
        Ok(count == 0)
    }

    async fn has_source(&self, name: &str) -> Result<bool> {
        if name.is_empty() {
            return Ok(false);
        }

        let body = serde_json::json!({
            "where": { "source": name },
            "limit": 1,
            "include": [],
        });
        let json = self.collection_post("get", &body).await?;

        let found = json
            .get("ids")
            .and_then(|ids| ids.as_array())
            .map(|ids| !ids.is_empty())
            .unwrap_or(false);
        Ok(found)
    }
}

/// Parse a Chroma query response into matches, nearest-first.
///
/// Chroma returns per-query nested arrays; only the first query's results
/// are read. Distance is cosine distance, reported as `1 - distance`.
fn parse_query_response(json: &serde_json::Value) -> Vec<SimilarMatch> {
    let first = |key: &str| {
        json.get(key)
            .and_then(|v| v.as_array())
            .and_then(|outer| outer.first())
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default()
    };

    let documents = first("documents");
    let metadatas = first("metadatas");
    let distances = first("distances");

    documents
        .iter()
        .enumerate()
        .filter_map(|(i, doc)| {
            let text = doc.as_str()?.to_string();
            let source = metadatas
                .get(i)
                .and_then(|m| m.get("source"))
                .and_then(|s| s.as_str())
                .map(|s| s.to_string());
            let distance = distances.get(i).and_then(|d| d.as_f64()).unwrap_or(0.0);
            Some(SimilarMatch {
                text,
                source,
                score: (1.0 - distance) as f32,
            })
        })
        .collect()
}
