//! Application errors.

use sgdis_application::HttpClientError;
use sgdis_application::ports::StorageError;
use sgdis_infrastructure::ConfigError;
use thiserror::Error;

/// Failures that stop the client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An HTTP adapter could not be built.
    #[error("HTTP client setup failed: {0}")]
    Http(#[from] HttpClientError),

    /// The session store could not be opened or written.
    #[error("session store error: {0}")]
    Storage(#[from] StorageError),

    /// Terminal I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
