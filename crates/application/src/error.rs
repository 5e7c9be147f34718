//! Application error types

use thiserror::Error;

use crate::ports::HttpClientError;

/// Errors surfaced by authenticated requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// No valid access token could be obtained; the logout path has started.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpClientError),

    /// The response body was not what the caller expected.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
