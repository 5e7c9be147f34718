//! Session start-up and the proactive refresh timer.

use std::sync::Mutex;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{LogoutReason, SessionManager};

/// What start-up found and did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// The route is public; nothing was done.
    Skipped,
    /// A valid token was already cached.
    Ready,
    /// No token was cached; one was obtained from the refresh cookie.
    Restored,
    /// No token could be obtained at first, but one appeared during the
    /// grace period.
    Recovered,
    /// The cached token was stale and has been refreshed.
    Refreshed,
    /// The cached token was stale and refreshing failed; the session
    /// continues with it.
    RefreshFailed,
    /// No session could be established; the user is sent to login.
    RedirectedToLogin,
}

impl BootstrapOutcome {
    /// Whether the proactive refresh timer runs after this outcome.
    #[must_use]
    pub const fn keeps_session(self) -> bool {
        !matches!(self, Self::Skipped | Self::RedirectedToLogin)
    }
}

/// Runs once per application start and owns the periodic refresh.
#[derive(Debug)]
pub struct SessionBootstrap {
    session: SessionManager,
    periodic: Mutex<Option<PeriodicRefresh>>,
}

impl SessionBootstrap {
    /// Creates the bootstrapper.
    #[must_use]
    pub const fn new(session: SessionManager) -> Self {
        Self {
            session,
            periodic: Mutex::new(None),
        }
    }

    /// Establishes the session for `route`.
    pub async fn run(&self, route: &str) -> BootstrapOutcome {
        let config = self.session.config();
        if config.is_public_route(route) {
            debug!(route, "Public route; session bootstrap skipped");
            return BootstrapOutcome::Skipped;
        }

        let outcome = if self.session.credentials().access_token().is_none() {
            self.restore().await
        } else if self.session.is_token_expired() {
            if self.session.refresh_token(true).await {
                BootstrapOutcome::Refreshed
            } else {
                warn!("Stale access token could not be refreshed at start-up");
                BootstrapOutcome::RefreshFailed
            }
        } else {
            BootstrapOutcome::Ready
        };

        info!(route, ?outcome, "Session bootstrap finished");
        if outcome.keeps_session() {
            self.start_periodic_refresh();
        }
        outcome
    }

    /// Starts (or restarts) the proactive refresh timer.
    pub fn start_periodic_refresh(&self) {
        let next = PeriodicRefresh::start(self.session.clone());
        let mut slot = self
            .periodic
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // Dropping the previous handle aborts its task.
        *slot = Some(next);
    }

    /// Stops the proactive refresh timer.
    pub fn stop_periodic_refresh(&self) {
        self.periodic
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
    }

    /// Whether the proactive refresh timer is live.
    #[must_use]
    pub fn is_refreshing_periodically(&self) -> bool {
        self.periodic
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
            .is_some_and(|p| !p.handle.is_finished())
    }

    async fn restore(&self) -> BootstrapOutcome {
        if self.session.refresh_token(true).await {
            return BootstrapOutcome::Restored;
        }

        let grace = self.session.config().bootstrap_grace();
        debug!(?grace, "No session yet; waiting before redirecting");
        tokio::time::sleep(grace).await;

        if self.session.credentials().access_token().is_some() {
            return BootstrapOutcome::Recovered;
        }

        self.session
            .terminator()
            .terminate(LogoutReason::SessionExpired)
            .await;
        BootstrapOutcome::RedirectedToLogin
    }
}

/// Background task calling `refresh_token(false)` on a fixed interval.
///
/// The task is aborted when the handle is dropped.
#[derive(Debug)]
pub struct PeriodicRefresh {
    handle: JoinHandle<()>,
}

impl PeriodicRefresh {
    /// Spawns the timer on the current runtime.
    #[must_use]
    pub fn start(session: SessionManager) -> Self {
        let period = session.config().refresh_interval();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                session.refresh_token(false).await;
            }
        });
        Self { handle }
    }
}

impl Drop for PeriodicRefresh {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
