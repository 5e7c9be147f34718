//! Authentication adapters.

mod refresh_client;

pub use refresh_client::HttpTokenRefresher;
