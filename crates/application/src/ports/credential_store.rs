//! Storage ports for session credentials
//!
//! Two stores hold the same logical credential: a persistent key-value
//! store (the `localStorage` of the web client) and the cookie jar.

use sgdis_domain::Cookie;
use thiserror::Error;

/// Errors raised by a credential store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Process-wide persistent key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Reads a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Writes a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deletes a value. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the deletion could not be persisted.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// The cookie jar shared with the backend.
pub trait CookieStore: Send + Sync {
    /// Value of a live cookie.
    fn get(&self, name: &str) -> Option<String>;

    /// Stores a cookie, replacing one with the same name.
    fn set(&self, cookie: Cookie);

    /// Deletes a cookie.
    fn remove(&self, name: &str);

    /// Applies `Set-Cookie` header values from a backend response.
    fn apply_set_cookies(&self, headers: &[String]);
}
