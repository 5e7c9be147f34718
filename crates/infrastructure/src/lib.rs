//! SGDIS Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer.

pub mod adapters;
pub mod auth;
pub mod configuration;
pub mod console;
pub mod persistence;

pub use adapters::{ReqwestHttpClient, SystemClock, TokioScheduler};
pub use auth::HttpTokenRefresher;
pub use configuration::{ConfigError, load_config};
pub use console::{ConsoleNavigator, ConsoleWarningView, TerminalBell, TracingNotifier};
pub use persistence::{FileKeyValueStore, MemoryKeyValueStore, SharedCookieJar};
