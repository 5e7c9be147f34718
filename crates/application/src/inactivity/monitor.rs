//! Runtime around the inactivity state machine.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sgdis_domain::{
    ActivityKind, CountdownStyle, Effect, InactivityConfig, InactivityEvent, InactivityMachine,
    InactivityState, TimerKind,
};
use futures::{Stream, StreamExt};
use tracing::{debug, error, info};

use crate::auth::{Credentials, LogoutReason, SessionTerminator};
use crate::ports::{AlertSound, Scheduler, WarningView};

/// Watches user activity and ends idle sessions.
///
/// Events are applied one at a time under a lock, and each transition's
/// effects are carried out before the next event is looked at.
pub struct InactivityMonitor {
    machine: Mutex<InactivityMachine>,
    scheduler: Arc<dyn Scheduler>,
    view: Arc<dyn WarningView>,
    alert: Arc<dyn AlertSound>,
    terminator: Arc<SessionTerminator>,
}

impl std::fmt::Debug for InactivityMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InactivityMonitor")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl InactivityMonitor {
    /// Creates a monitor that has not started watching yet.
    #[must_use]
    pub fn new(
        config: InactivityConfig,
        scheduler: Arc<dyn Scheduler>,
        view: Arc<dyn WarningView>,
        alert: Arc<dyn AlertSound>,
        terminator: Arc<SessionTerminator>,
    ) -> Self {
        Self {
            machine: Mutex::new(InactivityMachine::new(config)),
            scheduler,
            view,
            alert,
            terminator,
        }
    }

    /// Starts watching.
    pub fn start(&self) {
        let mut machine = self.lock();
        let effects = machine.start();
        if !effects.is_empty() {
            info!(
                threshold_secs = machine.config().threshold_secs,
                "Inactivity monitor started"
            );
        }
        self.apply(&mut machine, effects);
    }

    /// Starts watching only if an access token is cached.
    ///
    /// Returns whether the monitor is now running.
    pub fn start_if_signed_in(&self, credentials: &Credentials) -> bool {
        if credentials.access_token().is_none() {
            debug!("No access token; inactivity monitor not started");
            return false;
        }
        self.start();
        self.state() != InactivityState::Inactive
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> InactivityState {
        self.lock().state()
    }

    /// Feeds one event through the machine and carries out its effects.
    pub fn handle(&self, event: InactivityEvent) {
        let mut machine = self.lock();
        let before = machine.state();
        let effects = machine.handle(event);
        let after = machine.state();
        if before != after {
            debug!(?event, from = ?before, to = ?after, "Inactivity state changed");
        }
        self.apply(&mut machine, effects);
    }

    /// The user did something.
    pub fn record_activity(&self, kind: ActivityKind) {
        self.handle(InactivityEvent::Activity(kind));
    }

    /// A scheduled timer fired.
    pub fn fire(&self, timer: TimerKind) {
        self.handle(InactivityEvent::Timer(timer));
    }

    /// The user chose to stay signed in.
    pub fn stay_active(&self) {
        self.handle(InactivityEvent::StayActive);
    }

    /// The user chose to log out from the warning.
    pub fn logout(&self) {
        self.handle(InactivityEvent::LogoutRequested);
    }

    /// Stops watching; every later event is ignored.
    pub fn destroy(&self) {
        self.handle(InactivityEvent::Stop);
    }

    /// Delivers fired timers from `timers` until the stream ends or the
    /// monitor is destroyed.
    pub async fn run(self: Arc<Self>, mut timers: impl Stream<Item = TimerKind> + Unpin) {
        while let Some(timer) = timers.next().await {
            self.fire(timer);
            if self.state() == InactivityState::Stopped {
                break;
            }
        }
        debug!("Inactivity timer loop finished");
    }

    fn apply(&self, machine: &mut InactivityMachine, effects: Vec<Effect>) {
        let config = *machine.config();
        let style = |remaining| {
            CountdownStyle::for_remaining(remaining, config.warning_secs, config.pulse_secs)
        };

        let mut queue = VecDeque::from(effects);
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Arm { timer, after } => {
                    debug!(?timer, ?after, "Arming timer");
                    self.scheduler.schedule(timer, after);
                }
                Effect::Cancel(timer) => self.scheduler.cancel(timer),
                Effect::ShowWarning { remaining } => {
                    if let Err(e) = self.view.show(remaining, style(remaining)) {
                        error!(
                            error = %e,
                            "Inactivity warning cannot be shown; idle logout disabled until next activity"
                        );
                        queue.clear();
                        queue.extend(machine.handle(InactivityEvent::WarningUnavailable));
                    } else {
                        info!(remaining, "Inactivity warning shown");
                    }
                }
                Effect::UpdateCountdown { remaining } => {
                    self.view.update(remaining, style(remaining));
                }
                Effect::HideWarning => self.view.hide(),
                Effect::PlayAlert => {
                    if let Err(e) = self.alert.play() {
                        debug!(error = %e, "Alert sound skipped");
                    }
                }
                Effect::Logout => {
                    if self.terminator.begin(LogoutReason::Inactivity) {
                        info!("Signed out after inactivity");
                    } else {
                        debug!("Session already ending; joining pending logout");
                    }
                }
                Effect::Redirect => {
                    self.terminator.complete();
                }
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, InactivityMachine> {
        self.machine.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for InactivityMonitor {
    fn drop(&mut self) {
        self.destroy();
    }
}
