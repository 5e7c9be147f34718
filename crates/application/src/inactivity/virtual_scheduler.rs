//! Deterministic scheduler driven by an explicit virtual clock.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use sgdis_domain::TimerKind;

use crate::ports::Scheduler;

#[derive(Debug, Default)]
struct Timeline {
    now: Duration,
    seq: u64,
    armed: BTreeMap<TimerKind, (Duration, u64)>,
}

impl Timeline {
    fn pop_due(&mut self, until: Duration) -> Option<TimerKind> {
        let (kind, (deadline, _)) = self
            .armed
            .iter()
            .filter(|(_, (deadline, _))| *deadline <= until)
            .min_by_key(|(_, (deadline, seq))| (*deadline, *seq))
            .map(|(kind, slot)| (*kind, *slot))?;
        self.armed.remove(&kind);
        self.now = deadline;
        Some(kind)
    }
}

/// A [`Scheduler`] whose time only moves through [`advance`](Self::advance).
///
/// Timers due at the same instant fire in the order they were armed.
#[derive(Debug, Default)]
pub struct VirtualScheduler {
    timeline: Mutex<Timeline>,
}

impl VirtualScheduler {
    /// Creates a scheduler at virtual time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Whether `timer` is armed.
    #[must_use]
    pub fn is_armed(&self, timer: TimerKind) -> bool {
        self.lock().armed.contains_key(&timer)
    }

    /// Time left before `timer` fires, if armed.
    #[must_use]
    pub fn remaining(&self, timer: TimerKind) -> Option<Duration> {
        let timeline = self.lock();
        timeline
            .armed
            .get(&timer)
            .map(|(deadline, _)| deadline.saturating_sub(timeline.now))
    }

    /// Moves time forward by `by`, calling `fire` for every timer that
    /// comes due, in deadline order.
    ///
    /// `fire` runs without any internal lock held, so it may arm or cancel
    /// timers; a timer it arms within the window fires in the same call.
    pub fn advance(&self, by: Duration, mut fire: impl FnMut(TimerKind)) {
        let until = self.lock().now + by;
        loop {
            let due = self.lock().pop_due(until);
            match due {
                Some(kind) => fire(kind),
                None => break,
            }
        }
        self.lock().now = until;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Timeline> {
        self.timeline.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for VirtualScheduler {
    fn schedule(&self, timer: TimerKind, after: Duration) {
        let mut timeline = self.lock();
        timeline.seq += 1;
        let slot = (timeline.now + after, timeline.seq);
        timeline.armed.insert(timer, slot);
    }

    fn cancel(&self, timer: TimerKind) {
        self.lock().armed.remove(&timer);
    }
}
