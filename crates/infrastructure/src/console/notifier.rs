//! Notifications and navigation for the terminal front end.

use sgdis_application::ports::{Navigator, Notice, NoticeLevel, Notifier};
use tokio::sync::watch;
use tracing::{info, warn};

/// Writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => info!(target: "sgdis::notice", "{}", notice.message),
            NoticeLevel::Warning => warn!(target: "sgdis::notice", "{}", notice.message),
        }
    }
}

/// Tracks the current route; redirects publish the new one.
#[derive(Debug)]
pub struct ConsoleNavigator {
    route: watch::Sender<String>,
}

impl ConsoleNavigator {
    /// Starts at `initial` and returns a receiver observing route changes.
    #[must_use]
    pub fn new(initial: impl Into<String>) -> (Self, watch::Receiver<String>) {
        let (route, rx) = watch::channel(initial.into());
        (Self { route }, rx)
    }

    /// The current route.
    #[must_use]
    pub fn current(&self) -> String {
        self.route.borrow().clone()
    }
}

impl Navigator for ConsoleNavigator {
    fn redirect(&self, path: &str) {
        info!(path, "Navigating");
        self.route.send_replace(path.to_string());
    }
}
