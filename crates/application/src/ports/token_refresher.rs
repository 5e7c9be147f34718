//! Token refresh port

use async_trait::async_trait;
use thiserror::Error;

/// Outcome of a successful token exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedToken {
    /// The new access token.
    pub access_token: String,
    /// `Set-Cookie` values returned with the token, e.g. a rotated refresh token.
    pub set_cookies: Vec<String>,
}

/// Why a token exchange failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefreshError {
    /// The backend refused the refresh token (401/403).
    #[error("refresh token rejected with status {status}")]
    Rejected {
        /// HTTP status received.
        status: u16,
    },

    /// The backend failed with a non-authorization status.
    #[error("refresh endpoint returned status {status}")]
    Server {
        /// HTTP status received.
        status: u16,
    },

    /// No response was received.
    #[error("network error: {0}")]
    Network(String),

    /// Success status without a usable token.
    #[error("malformed refresh response: {0}")]
    MalformedResponse(String),
}

impl RefreshError {
    /// Returns true when the credential pair is dead and must be cleared.
    ///
    /// Every other failure is transient: stored credentials stay in place
    /// and the next scheduled refresh may succeed.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

/// Port exchanging a refresh token for a new access token.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Performs one exchange against the refresh endpoint.
    ///
    /// # Errors
    ///
    /// Returns a [`RefreshError`] describing why no token was obtained.
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedToken, RefreshError>;
}
