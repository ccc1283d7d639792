//! # ragchat CLI
//!
//! Process entry point for the chat backend.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ragchat serve` | Ingest the documents folder, then serve the HTTP API |
//! | `ragchat ingest` | Run the ingestion pipeline once and exit |
//! | `ragchat ask <user-id> <message>` | Answer one query from the terminal |
//!
//! All configuration is environment-driven (`REDIS_*`, `CHROMA_*`,
//! `OLLAMA_*`, `CHUNK_SIZE`, `CHUNK_OVERLAP`, `EMBEDDING_MODEL_NAME`,
//! `FOLDER_PATH`, `BIND_ADDR`); see `config` for the defaults.
//!
//! Backend connections are established and verified before any traffic is
//! accepted; an unreachable backend aborts startup. Ingestion runs to
//! completion before the server binds, so readiness implies the document
//! folder has been processed.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use ragchat::config::Settings;
use ragchat::embedding::{self, EmbeddingProvider};
use ragchat::generation::OllamaGenerator;
use ragchat::history::RedisHistory;
use ragchat::ingest::IngestionPipeline;
use ragchat::loader::FolderLoader;
use ragchat::rag::RagPipeline;
use ragchat::server::run_server;
use ragchat::vector_store::{ChromaStore, VectorStore};

/// ragchat — a retrieval-augmented chat backend.
#[derive(Parser)]
#[command(
    name = "ragchat",
    about = "A retrieval-augmented chat backend over pluggable vector, embedding, and generation providers",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest the documents folder, then serve the HTTP API.
    Serve,

    /// Run the ingestion pipeline once and exit.
    Ingest,

    /// Answer a single query from the terminal.
    Ask {
        /// User identifier (scopes conversation history).
        user_id: String,
        /// The message to answer.
        message: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env().context("failed to load settings")?;

    match cli.command {
        Commands::Serve => {
            let (loader, embedder, vector_store) = build_ingest_components(&settings).await?;
            let rag = build_rag_pipeline(&settings, embedder.clone(), vector_store.clone()).await?;

            IngestionPipeline::new(loader, embedder, vector_store.clone())
                .run(&settings.folder_path)
                .await
                .context("ingestion failed")?;

            if vector_store.is_empty().await? {
                tracing::warn!("vector store is empty; answers will have no document context");
            }

            run_server(&settings.bind, Arc::new(rag)).await?;
        }
        Commands::Ingest => {
            let (loader, embedder, vector_store) = build_ingest_components(&settings).await?;
            let report = IngestionPipeline::new(loader, embedder, vector_store)
                .run(&settings.folder_path)
                .await
                .context("ingestion failed")?;
            println!(
                "ingested {} documents ({} chunks), skipped {}",
                report.ingested, report.chunks, report.skipped
            );
        }
        Commands::Ask { user_id, message } => {
            let (_, embedder, vector_store) = build_ingest_components(&settings).await?;
            let rag = build_rag_pipeline(&settings, embedder, vector_store).await?;
            let answer = rag.answer(&user_id, &message).await?;
            println!("{}", answer);
        }
    }

    Ok(())
}

/// Construct the loader, embedder, and vector store, verifying backend
/// liveness. Failures here are fatal to startup.
async fn build_ingest_components(
    settings: &Settings,
) -> anyhow::Result<(
    Arc<FolderLoader>,
    Arc<dyn EmbeddingProvider>,
    Arc<dyn VectorStore>,
)> {
    let loader = Arc::new(FolderLoader::new(
        settings.chunking.chunk_size,
        settings.chunking.chunk_overlap,
    )?);
    let embedder = embedding::create_provider(&settings.embedding)
        .context("failed to initialize embedding provider")?;
    let vector_store: Arc<dyn VectorStore> = Arc::new(
        ChromaStore::connect(&settings.vector)
            .await
            .context("failed to connect to vector store")?,
    );
    Ok((loader, embedder, vector_store))
}

/// Construct the query pipeline (history store + generation endpoint).
async fn build_rag_pipeline(
    settings: &Settings,
    embedder: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
) -> anyhow::Result<RagPipeline> {
    let history = Arc::new(
        RedisHistory::connect(&settings.history)
            .await
            .context("failed to connect to history store")?,
    );
    let generator = Arc::new(
        OllamaGenerator::connect(&settings.generation)
            .await
            .context("failed to connect to generation endpoint")?,
    );
    Ok(RagPipeline::new(history, vector_store, embedder, generator))
}
