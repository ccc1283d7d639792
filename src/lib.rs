//! # ragchat
//!
//! A retrieval-augmented chat backend over pluggable vector, embedding,
//! and generation providers.
//!
//! Documents are ingested once at startup (load → chunk → embed → store);
//! each chat request then runs the query pipeline: embed the query,
//! retrieve the nearest chunks, blend them with the user's recent
//! conversation history into a prompt, generate an answer, and persist the
//! exchange.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────┐   ┌───────────┐
//! │  Folder   │──▶│  Ingestion    │──▶│  Vector    │
//! │ PDF/txt   │   │ Chunk+Embed  │   │  Store     │
//! └───────────┘   └──────────────┘   └─────┬─────┘
//!                                          │
//! ┌───────────┐   ┌──────────────┐         │
//! │  HTTP     │──▶│     RAG       │◀────────┤
//! │ /chat     │   │  Pipeline     │◀──┐     │
//! └───────────┘   └──────┬───────┘   │     │
//!                        ▼           │     │
//!                 ┌──────────────┐  ┌┴─────┴────┐
//!                 │  Generation   │  │  History   │
//!                 │  (Ollama)     │  │  (Redis)   │
//!                 └──────────────┘  └───────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Environment-driven settings |
//! | [`models`] | Core data types |
//! | [`chunk`] | Overlapping text splitting |
//! | [`loader`] | Document loading (PDF, plain text) |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`generation`] | Generation provider abstraction |
//! | [`vector_store`] | Vector store abstraction (Chroma) |
//! | [`history`] | Conversation history (Redis) |
//! | [`ingest`] | Ingestion orchestrator |
//! | [`rag`] | Query orchestrator |
//! | [`server`] | HTTP API |

pub mod chunk;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod history;
pub mod ingest;
pub mod loader;
pub mod models;
pub mod rag;
pub mod server;
pub mod vector_store;
