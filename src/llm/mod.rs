//! Language-model seam and the Gemini client.

pub mod gemini;

pub use gemini::{GeminiClient, GeminiConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One single-turn request: system instructions plus a user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRequest {
    pub system: String,
    pub user: String,
}

/// Errors returned by a language model call.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model request timed out after {0}s")]
    Timeout(u64),

    #[error("Cannot connect to model API at {0}")]
    Connect(String),

    #[error("Model request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Model API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Prompt was blocked by the model: {0}")]
    Blocked(String),

    #[error("Model returned no text")]
    Empty,
}

/// A text generation backend.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier, recorded in the digest.
    fn model_name(&self) -> &str;

    /// Send the request once and return the generated text verbatim.
    async fn generate(
        &self,
        request: &ModelRequest,
        api_key: &str,
    ) -> Result<String, ModelError>;
}
