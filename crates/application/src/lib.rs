//! SGDIS Application - Session orchestration and ports
//!
//! This crate defines the application layer with:
//! - Port traits (interfaces for the backend, storage, timers and UI)
//! - Token lifecycle management with single-flight refresh
//! - The inactivity monitor runtime

pub mod auth;
pub mod error;
pub mod inactivity;
pub mod ports;

#[cfg(test)]
mod testing;

pub use auth::{
    AuthenticatedClient, BootstrapOutcome, Credentials, LogoutReason, PeriodicRefresh,
    SessionBootstrap, SessionManager, SessionTerminator,
};
pub use error::{SessionError, SessionResult};
pub use inactivity::{InactivityMonitor, VirtualScheduler};
pub use ports::{Clock, HttpClient, HttpClientError, Scheduler, TokenRefresher};
