//! Inactivity timeout
//!
//! The state machine lives in the domain crate; this module wires it to a
//! [`Scheduler`](crate::ports::Scheduler), the warning view and the logout
//! path.

mod monitor;
mod virtual_scheduler;

pub use monitor::InactivityMonitor;
pub use virtual_scheduler::VirtualScheduler;
