//! Generation provider abstraction and Ollama implementation.
//!
//! [`OllamaGenerator`] calls a remote Ollama instance's `POST /api/generate`
//! endpoint (non-streaming). Connectivity is verified once at construction
//! via `GET /api/tags`; construction fails fast with a connection error
//! rather than deferring discovery to the first request.
//!
//! A blank prompt is rejected before any network call. Some models echo the
//! formatted prompt at the head of the completion; the echo is stripped and
//! the result trimmed.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::GenerationConfig;
use crate::error::{Error, Result};

/// Probe timeout, independent of the (much longer) generation timeout.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Turns a formatted prompt into generated text.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate a completion for `prompt`, bounded by `max_tokens`.
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}

/// Generation via a remote Ollama endpoint.
pub struct OllamaGenerator {
    base_url: String,
    model: String,
    prompt_format: String,
    client: reqwest::Client,
}

impl OllamaGenerator {
    /// Build the client and verify the endpoint is reachable.
    pub async fn connect(config: &GenerationConfig) -> Result<Self> {
        let base_url = config.base_url();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Connection(format!("failed to build HTTP client: {}", e)))?;

        let generator = Self {
            base_url,
            model: config.model.clone(),
            prompt_format: config.prompt_format.clone(),
            client,
        };
        generator.verify_connection().await?;

        info!(
            model = %generator.model,
            endpoint = %generator.base_url,
            timeout_secs = config.timeout_secs,
            "generation endpoint ready"
        );
        Ok(generator)
    }

    async fn verify_connection(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                Error::Connection(format!(
                    "generation endpoint unreachable at {}: {}",
                    self.base_url, e
                ))
            })?;

        if !response.status().is_success() {
            return Err(Error::Connection(format!(
                "generation endpoint at {} returned {}",
                self.base_url,
                response.status()
            )));
        }
        Ok(())
    }

    fn format_prompt(&self, prompt: &str) -> String {
        self.prompt_format.replace("{prompt}", prompt)
    }
}

#[async_trait]
impl GenerationProvider for OllamaGenerator {
    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(Error::Validation("the prompt cannot be empty".to_string()));
        }

        let formatted = self.format_prompt(prompt);
        debug!(prompt_chars = formatted.len(), max_tokens, "generating response");

        let body = serde_json::json!({
            "model": self.model,
            "prompt": formatted,
            "stream": false,
            "options": {
                "num_ctx": 1024,
                "num_batch": 256,
                "num_predict": max_tokens,
                "temperature": 0.3,
                "top_p": 0.9,
                "num_gpu": 1,
                "main_gpu": 0
            }
        });

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Generation(format!("generation request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Generation(format!(
                "generation endpoint returned {}: {}",
                status, detail
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Generation(format!("invalid generation response: {}", e)))?;

        let raw = json
            .get("response")
            .and_then(|r| r.as_str())
            .unwrap_or_default();

        let text = strip_prompt_echo(&formatted, raw);
        if text.is_empty() {
            return Err(Error::Generation(
                "generation endpoint returned an empty completion".to_string(),
            ));
        }
        Ok(text)
    }
}

/// Remove any echo of the formatted prompt from the completion and trim
/// surrounding whitespace.
fn strip_prompt_echo(formatted_prompt: &str, response: &str) -> String {
    response.replace(formatted_prompt, "").trim().to_string()
}
