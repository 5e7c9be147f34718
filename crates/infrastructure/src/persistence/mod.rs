//! Credential persistence adapters.

mod cookie_store;
mod key_value;

pub use cookie_store::SharedCookieJar;
pub use key_value::{FileKeyValueStore, MemoryKeyValueStore};
