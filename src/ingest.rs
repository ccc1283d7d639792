//! Ingestion pipeline orchestration.
//!
//! Coordinates the startup flow: load documents from the folder, skip
//! sources already present in the vector store, then chunk, batch-embed,
//! and store each remaining document's chunks in order.
//!
//! Failure policy: a document that fails to load is skipped by the loader;
//! a document whose embed or store step fails is logged and abandoned
//! (its remaining chunks are not written), and ingestion continues with the
//! next document. There is no rollback, so a partially ingested document is
//! possible; `has_source` makes re-running ingestion a no-op for anything
//! already present.

use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::loader::DocumentLoader;
use crate::models::Document;
use crate::vector_store::VectorStore;

/// Counters reported after an ingestion run.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Documents newly ingested.
    pub ingested: usize,
    /// Documents skipped because their source was already present.
    pub skipped: usize,
    /// Chunks written across all newly ingested documents.
    pub chunks: usize,
}

/// Orchestrates load → dedup → chunk → embed → store.
pub struct IngestionPipeline {
    loader: Arc<dyn DocumentLoader>,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
}

impl IngestionPipeline {
    pub fn new(
        loader: Arc<dyn DocumentLoader>,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            loader,
            embedder,
            store,
        }
    }

    /// Ingest every document under `folder` that is not already stored.
    pub async fn run(&self, folder: &Path) -> Result<IngestReport> {
        let documents = self.loader.load(folder).await?;
        info!(folder = %folder.display(), documents = documents.len(), "starting ingestion");

        let mut report = IngestReport::default();
        for document in &documents {
            if self.store.has_source(&document.name).await? {
                info!(document = %document.name, "already ingested, skipping");
                report.skipped += 1;
                continue;
            }

            match self.ingest_document(document).await {
                Ok(chunks) => {
                    info!(document = %document.name, chunks, "ingested document");
                    report.ingested += 1;
                    report.chunks += chunks;
                }
                Err(e) => {
                    warn!(document = %document.name, error = %e, "failed to ingest document, continuing");
                }
            }
        }

        info!(
            ingested = report.ingested,
            skipped = report.skipped,
            chunks = report.chunks,
            "ingestion complete"
        );
        Ok(report)
    }

    /// Chunk, embed, and store one document. The first failing chunk aborts
    /// the rest of this document.
    async fn ingest_document(&self, document: &Document) -> Result<usize> {
        let chunks = self.loader.split(document);
        let embedded = self.embedder.embed_batch(chunks).await?;
        for chunk in &embedded {
            self.store.add_chunk(chunk).await?;
        }
        Ok(embedded.len())
    }
}
