//! REST client error types.

use thiserror::Error;

/// Errors returned by [`ApiClient`](super::ApiClient) calls.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The backend rejected the bearer token. The stored token has been cleared.
    #[error("unauthorized: session expired, log in again")]
    Unauthorized,

    #[error("HTTP error: {0}")]
    Http(u16),

    #[error("request timeout after {0}s")]
    Timeout(u64),

    #[error("connection failed: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}
