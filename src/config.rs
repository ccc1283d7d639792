//! Environment-driven application settings.
//!
//! Every backend the pipelines talk to is configured through environment
//! variables with drop-in defaults, grouped into per-section structs.
//! [`Settings::from_env`] reads and validates the full surface once at
//! startup; components receive their section by reference.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Folder scanned for documents at startup.
    pub folder_path: PathBuf,
    /// HTTP bind address.
    pub bind: String,
    pub history: HistoryConfig,
    pub vector: VectorConfig,
    pub chunking: ChunkingConfig,
    pub embedding: EmbeddingConfig,
    pub generation: GenerationConfig,
}

/// Connection settings for the conversation history backend (Redis).
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    pub host: String,
    pub port: u16,
    pub db: i64,
}

/// Connection settings for the vector store backend (Chroma).
#[derive(Debug, Clone)]
pub struct VectorConfig {
    pub host: String,
    pub port: u16,
    pub auth_token: String,
    pub collection: String,
}

#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters carried over between consecutive chunks.
    pub chunk_overlap: usize,
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub model_name: String,
}

/// Settings for the generation endpoint (Ollama).
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub host: String,
    pub port: u16,
    pub model: String,
    /// Template applied to every prompt; `{prompt}` is substituted.
    pub prompt_format: String,
    pub timeout_secs: u64,
}

impl GenerationConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl VectorConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Invalid value for {}: '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}

impl Settings {
    /// Load settings from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let settings = Self {
            folder_path: PathBuf::from(env_or("FOLDER_PATH", "./documents")),
            bind: env_or("BIND_ADDR", "0.0.0.0:8000"),
            history: HistoryConfig {
                host: env_or("REDIS_HOST", "redis"),
                port: env_parse("REDIS_PORT", 6379)?,
                db: env_parse("REDIS_DB", 0)?,
            },
            vector: VectorConfig {
                host: env_or("CHROMA_HOST", "chroma-db"),
                port: env_parse("CHROMA_PORT", 8000)?,
                auth_token: env_or("CHROMA_AUTH_TOKEN", ""),
                collection: env_or("CHROMA_COLLECTION", "documents"),
            },
            chunking: ChunkingConfig {
                chunk_size: env_parse("CHUNK_SIZE", 700)?,
                chunk_overlap: env_parse("CHUNK_OVERLAP", 50)?,
            },
            embedding: EmbeddingConfig {
                model_name: env_or(
                    "EMBEDDING_MODEL_NAME",
                    "sentence-transformers/all-MiniLM-L6-v2",
                ),
            },
            generation: GenerationConfig {
                host: env_or("OLLAMA_HOST", "localhost"),
                port: env_parse("OLLAMA_PORT", 11434)?,
                model: env_or("OLLAMA_MODEL", "phi3:instruct"),
                prompt_format: env_or(
                    "OLLAMA_MODEL_PROMPT_FORMAT",
                    "<|user|>\n{prompt}<|end|>\n<|assistant|>",
                ),
                timeout_secs: env_parse("OLLAMA_TIMEOUT", 240)?,
            },
        };

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            anyhow::bail!("CHUNK_SIZE must be > 0");
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            anyhow::bail!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                self.chunking.chunk_overlap,
                self.chunking.chunk_size
            );
        }
        if self.generation.timeout_secs == 0 {
            anyhow::bail!("OLLAMA_TIMEOUT must be > 0");
        }
        Ok(())
    }
}
