//! Generative model providers for Nova.
//!
//! All providers implement the `nova_core::Provider` trait.
//! [`ModelClient`] wraps one with the rate-limit retry policy, and the router
//! picks the provider named in configuration.

pub mod gemini;
pub mod openai_compat;
pub mod retry;
pub mod router;

pub use gemini::GeminiProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use retry::{ModelClient, ModelReply, RetryPolicy};
pub use router::build_from_config;

use nova_core::error::ProviderError;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Shared HTTP client settings for every provider.
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

pub(crate) fn map_transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}

/// Classify a non-200 response.
pub(crate) fn map_status_error(status: u16, body: String) -> ProviderError {
    match status {
        429 => ProviderError::RateLimited(body),
        401 | 403 => ProviderError::AuthenticationFailed(body),
        _ => ProviderError::ApiError {
            status_code: status,
            message: body,
        },
    }
}
