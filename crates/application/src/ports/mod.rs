//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the session core and the outside
//! world. Each port is a trait implemented by adapters in the
//! infrastructure layer, or by in-memory fakes in tests.

mod clock;
mod credential_store;
mod http_client;
mod scheduler;
mod token_refresher;
mod ui;

pub use clock::{Clock, ManualClock};
pub use credential_store::{CookieStore, KeyValueStore, StorageError};
pub use http_client::{HttpClient, HttpClientError};
pub use scheduler::Scheduler;
pub use token_refresher::{RefreshError, RefreshedToken, TokenRefresher};
pub use ui::{
    AlertError, AlertSound, Navigator, Notice, NoticeLevel, Notifier, WarningView,
    WarningViewError,
};
