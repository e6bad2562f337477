//! Error types for the Nova domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each collaborator boundary has its own error enum.

use thiserror::Error;

/// The top-level error type for all Nova operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Substrings in an error body that mark a rate-limit-class failure.
const RATE_LIMIT_MARKERS: &[&str] = &["429", "resource_exhausted", "quota"];

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider: {0}")]
    RateLimited(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Whether the caller should back off and retry this failure.
    ///
    /// True for [`ProviderError::RateLimited`], for API errors with status
    /// 429, and for any error whose text mentions a quota or resource
    /// exhaustion.
    pub fn is_rate_limit(&self) -> bool {
        match self {
            Self::RateLimited(_) => true,
            Self::ApiError { status_code: 429, .. } => true,
            Self::AuthenticationFailed(_) | Self::NotConfigured(_) => false,
            other => {
                let text = other.to_string().to_lowercase();
                RATE_LIMIT_MARKERS.iter().any(|m| text.contains(m))
            }
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum LookupError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status} from {service}")]
    Http { service: String, status: u16 },

    #[error("Unexpected response from {service}: {reason}")]
    Parse { service: String, reason: String },

    #[error("Lookup timed out after {0}s")]
    Timeout(u64),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Io(String),

    #[error("Invalid session id: {0:?}")]
    InvalidSessionId(String),

    #[error("Failed to encode record: {0}")]
    Encode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 500,
            message: "Internal".into(),
        });
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("Internal"));
    }

    #[test]
    fn rate_limit_classification() {
        assert!(ProviderError::RateLimited("slow down".into()).is_rate_limit());
        assert!(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into()
        }
        .is_rate_limit());
        assert!(ProviderError::ApiError {
            status_code: 400,
            message: "RESOURCE_EXHAUSTED: try later".into()
        }
        .is_rate_limit());
        assert!(ProviderError::Network("daily quota exceeded".into()).is_rate_limit());
    }

    #[test]
    fn non_rate_limit_errors() {
        assert!(!ProviderError::ApiError {
            status_code: 500,
            message: "boom".into()
        }
        .is_rate_limit());
        assert!(!ProviderError::AuthenticationFailed("bad key".into()).is_rate_limit());
        assert!(!ProviderError::Timeout("120s".into()).is_rate_limit());
    }

    #[test]
    fn store_error_names_session() {
        let err = StoreError::InvalidSessionId("../etc".into());
        assert!(err.to_string().contains("../etc"));
    }
}
