//! Timer scheduling port

use std::time::Duration;

use sgdis_domain::TimerKind;

/// Arms and cancels the inactivity monitor's logical timers.
///
/// There is one slot per [`TimerKind`]: scheduling a kind that is already
/// armed replaces the pending timer. When a timer fires, the implementation
/// delivers its kind back to the monitor.
pub trait Scheduler: Send + Sync {
    /// Arms `timer` to fire after `after`, replacing any pending one.
    fn schedule(&self, timer: TimerKind, after: Duration);

    /// Cancels `timer` if armed.
    fn cancel(&self, timer: TimerKind);
}
