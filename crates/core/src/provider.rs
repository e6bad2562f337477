//! Provider trait: the abstraction over hosted generative models.
//!
//! A Provider takes one fully composed prompt and returns the generated
//! text. Retry policy lives above this trait (see `nova-providers::retry`).
//!
//! Implementations: Gemini native, OpenAI-compatible endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ProviderError;

/// A single generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// The model to use (e.g., "gemini-2.5-flash")
    pub model: String,

    /// The composed prompt text
    pub prompt: String,

    /// Temperature (0.0 = deterministic, 2.0 = very creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The generated text
    pub text: String,

    /// Which model actually responded
    pub model: String,

    /// Token usage statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core Provider trait.
///
/// Rate-limit failures must be reported so that
/// [`ProviderError::is_rate_limit`] returns true; the retrying client keys
/// off that classification.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "gemini", "openrouter").
    fn name(&self) -> &str;

    /// Send a prompt and get the complete response.
    async fn generate(
        &self,
        request: GenerateRequest,
    ) -> std::result::Result<GenerateResponse, ProviderError>;
}
