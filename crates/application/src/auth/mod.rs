//! Token lifecycle management
//!
//! This module keeps the access token usable for the lifetime of the
//! application: caching, refreshing with a single in-flight request,
//! authenticating outgoing requests, and ending the session when no
//! credential can be obtained.

mod bootstrap;
mod credentials;
mod interceptor;
mod session;
mod terminator;

pub use bootstrap::{BootstrapOutcome, PeriodicRefresh, SessionBootstrap};
pub use credentials::Credentials;
pub use interceptor::AuthenticatedClient;
pub use session::SessionManager;
pub use terminator::{LogoutReason, SessionTerminator};
