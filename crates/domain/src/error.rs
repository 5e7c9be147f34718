//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A configured duration must be greater than zero.
    #[error("invalid duration for {0}: must be greater than zero")]
    ZeroDuration(&'static str),

    /// A configured path is malformed.
    #[error("invalid path for {field}: {value}")]
    InvalidPath {
        /// Configuration field holding the path.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A configured duration exceeds the supported maximum.
    #[error("invalid duration for {field}: must be at most {max}")]
    DurationTooLong {
        /// Configuration field holding the duration.
        field: &'static str,
        /// Largest accepted value, in the field's unit.
        max: u64,
    },

    /// The backend URL cannot be parsed.
    #[error("invalid backend URL {value}: {reason}")]
    InvalidUrl {
        /// The rejected value.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Errors raised while decoding a JWT access token.
///
/// Every variant means the same thing to callers: the token cannot be
/// trusted and must be treated as expired.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token is not made of three dot-separated segments.
    #[error("expected 3 token segments, found {0}")]
    WrongSegmentCount(usize),

    /// The payload segment is not valid base64url.
    #[error("payload is not valid base64: {0}")]
    InvalidBase64(String),

    /// The payload is not a JSON object.
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(String),

    /// The payload has no numeric `exp` claim.
    #[error("payload has no usable exp claim")]
    MissingExpiry,
}
