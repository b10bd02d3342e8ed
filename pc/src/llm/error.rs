//! Generation service error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during generation service calls
///
/// Only shapes the Gemini client actually produces: rate limiting carries the
/// server-advised wait, transport failures wrap the reqwest error, and a
/// response with no usable text is `InvalidResponse`.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    /// Check if this error is worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::RateLimited { .. } => true,
            GenerationError::ApiError { status, .. } => matches!(status, 408 | 429 | 500 | 502 | 503 | 504),
            GenerationError::Network(_) => true,
            GenerationError::InvalidResponse(_) => false,
        }
    }

    /// Get the retry duration if this is a rate limit error
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            GenerationError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(status: u16) -> GenerationError {
        GenerationError::ApiError {
            status,
            message: "error body".to_string(),
        }
    }

    #[test]
    fn test_is_retryable() {
        assert!(
            GenerationError::RateLimited {
                retry_after: Duration::from_secs(60)
            }
            .is_retryable()
        );

        assert!(api_error(408).is_retryable());
        assert!(api_error(500).is_retryable());
        assert!(api_error(503).is_retryable());

        assert!(!api_error(400).is_retryable());
        assert!(!api_error(404).is_retryable());

        assert!(!GenerationError::InvalidResponse("empty".to_string()).is_retryable());
    }

    #[test]
    fn test_retry_after() {
        let err = GenerationError::RateLimited {
            retry_after: Duration::from_secs(42),
        };
        assert_eq!(err.retry_after(), Some(Duration::from_secs(42)));

        assert_eq!(api_error(500).retry_after(), None);
        assert_eq!(GenerationError::InvalidResponse("empty".to_string()).retry_after(), None);
    }
}
