//! The terminal logout path shared by every component.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use sgdis_domain::SessionConfig;
use tracing::{debug, info};

use super::Credentials;
use crate::ports::{Navigator, Notice, Notifier};

/// Why the session is ending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// No valid credential could be obtained.
    SessionExpired,
    /// The inactivity countdown ran out.
    Inactivity,
    /// The user asked to log out.
    UserRequested,
}

impl LogoutReason {
    /// Closing notice shown to the user.
    #[must_use]
    pub fn notice(self) -> Notice {
        match self {
            Self::SessionExpired => {
                Notice::warning("Your session has expired. Please sign in again.")
            }
            Self::Inactivity => {
                Notice::warning("You were signed out after a period of inactivity.")
            }
            Self::UserRequested => Notice::info("You have been signed out."),
        }
    }
}

/// Clears credentials, tells the user, then sends them to the login page.
///
/// Ending is split in two steps so callers that own their own timers (the
/// inactivity monitor) can schedule the redirect themselves. Overlapping
/// terminations produce a single notice.
pub struct SessionTerminator {
    credentials: Credentials,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    login_path: String,
    redirect_delay: Duration,
    pending: AtomicBool,
}

impl std::fmt::Debug for SessionTerminator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTerminator")
            .field("login_path", &self.login_path)
            .field("redirect_delay", &self.redirect_delay)
            .field("pending", &self.pending.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl SessionTerminator {
    /// Creates a terminator redirecting to the configured login page.
    #[must_use]
    pub fn new(
        credentials: Credentials,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        config: &SessionConfig,
    ) -> Self {
        Self {
            credentials,
            notifier,
            navigator,
            login_path: config.login_path.clone(),
            redirect_delay: config.inactivity.redirect_delay(),
            pending: AtomicBool::new(false),
        }
    }

    /// Clears every credential and shows the closing notice.
    ///
    /// Returns false if a termination was already pending, in which case
    /// no second notice is shown.
    pub fn begin(&self, reason: LogoutReason) -> bool {
        self.credentials.clear_all();
        if self.pending.swap(true, Ordering::SeqCst) {
            return false;
        }
        info!(?reason, "Ending session");
        self.notifier.notify(reason.notice());
        true
    }

    /// Navigates to the login page if a termination is pending.
    ///
    /// Overlapping terminations share one redirect: only the first call
    /// after [`begin`](Self::begin) navigates. Returns whether it did.
    pub fn complete(&self) -> bool {
        if !self.pending.swap(false, Ordering::SeqCst) {
            debug!("No termination pending; redirect skipped");
            return false;
        }
        info!(path = %self.login_path, "Redirecting to login");
        self.navigator.redirect(&self.login_path);
        true
    }

    /// Runs both steps with the configured delay in between.
    pub async fn terminate(&self, reason: LogoutReason) {
        if self.begin(reason) {
            tokio::time::sleep(self.redirect_delay).await;
            self.complete();
        }
    }

    /// Starts [`terminate`](Self::terminate) in the background.
    pub fn spawn_terminate(self: &Arc<Self>, reason: LogoutReason) {
        let terminator = Arc::clone(self);
        tokio::spawn(async move { terminator.terminate(reason).await });
    }

    /// Whether a redirect is still outstanding.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }
}
