//! SGDIS Domain - Session core types
//!
//! This crate defines the domain model of the SGDIS session client:
//! access tokens, cookies, session settings and the inactivity state
//! machine. All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod cookie;
pub mod error;
pub mod inactivity;
pub mod request;
pub mod response;
pub mod settings;

pub use auth::{
    ACCESS_TOKEN_COOKIE, ACCESS_TOKEN_KEY, AccessToken, REFRESH_TOKEN_COOKIE, TokenStatus, is_expired,
};
pub use cookie::{Cookie, CookieJar, SameSite};
pub use error::{DomainError, DomainResult, TokenError};
pub use inactivity::{
    ActivityKind, CountdownStyle, Effect, InactivityEvent, InactivityMachine, InactivityState,
    Rgb, TimerKind, format_remaining,
};
pub use request::{ApiRequest, HttpMethod};
pub use response::{ApiResponse, StatusCode};
pub use settings::{InactivityConfig, MAX_DURATION_SECS, SessionConfig};
