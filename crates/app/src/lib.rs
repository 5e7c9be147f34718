//! SGDIS terminal client
//!
//! Wires the session core to terminal adapters: the authenticated client
//! for backend calls, token bootstrap with periodic refresh, and the
//! inactivity monitor fed by typed commands.

pub mod cli;
pub mod context;
pub mod error;
pub mod repl;

pub use cli::{Args, Command};
pub use context::{AppContext, Backing, Frontend};
pub use error::AppError;
pub use repl::Exit;
