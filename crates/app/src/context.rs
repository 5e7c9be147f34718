//! Wiring of the session components.

use std::sync::Arc;

use sgdis_application::ports::{
    AlertSound, Clock, CookieStore, KeyValueStore, Navigator, Notifier, Scheduler, WarningView,
};
use sgdis_application::{
    AuthenticatedClient, Credentials, InactivityMonitor, SessionBootstrap, SessionManager,
    SessionTerminator,
};
use sgdis_domain::SessionConfig;
use sgdis_infrastructure::{ConfigError, HttpTokenRefresher, ReqwestHttpClient};

use crate::error::AppError;

/// User-facing adapters.
#[derive(Clone)]
pub struct Frontend {
    /// Shows notices.
    pub notifier: Arc<dyn Notifier>,
    /// Changes the current route.
    pub navigator: Arc<dyn Navigator>,
    /// Renders the inactivity warning.
    pub warning: Arc<dyn WarningView>,
    /// Plays the warning cue.
    pub alert: Arc<dyn AlertSound>,
}

/// Where credentials live and how time passes.
#[derive(Clone)]
pub struct Backing {
    /// Persistent key-value store.
    pub store: Arc<dyn KeyValueStore>,
    /// Cookie jar.
    pub cookies: Arc<dyn CookieStore>,
    /// Wall clock.
    pub clock: Arc<dyn Clock>,
    /// Inactivity timers.
    pub scheduler: Arc<dyn Scheduler>,
}

/// Every long-lived component of a running client.
pub struct AppContext {
    /// Effective settings.
    pub config: SessionConfig,
    /// Token lifecycle.
    pub session: SessionManager,
    /// Client for all backend calls.
    pub client: AuthenticatedClient<ReqwestHttpClient>,
    /// Start-up and periodic refresh.
    pub bootstrap: SessionBootstrap,
    /// Inactivity timeout.
    pub monitor: Arc<InactivityMonitor>,
}

impl AppContext {
    /// Builds the component graph.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings fail validation or the backend URL
    /// is invalid.
    pub fn build(
        config: SessionConfig,
        backing: Backing,
        frontend: Frontend,
    ) -> Result<Self, AppError> {
        config.validate().map_err(ConfigError::from)?;
        let transport = ReqwestHttpClient::from_config(&config)?;
        let refresher = Arc::new(HttpTokenRefresher::from_config(&config)?);

        let credentials = Credentials::new(
            backing.store,
            backing.cookies,
            Arc::clone(&backing.clock),
            config.jwt_cookie_max_age(),
        );
        let terminator = Arc::new(SessionTerminator::new(
            credentials.clone(),
            frontend.notifier,
            frontend.navigator,
            &config,
        ));
        let session = SessionManager::new(
            config.clone(),
            credentials,
            refresher,
            backing.clock,
            Arc::clone(&terminator),
        );
        let monitor = Arc::new(InactivityMonitor::new(
            config.inactivity,
            backing.scheduler,
            frontend.warning,
            frontend.alert,
            terminator,
        ));

        Ok(Self {
            client: AuthenticatedClient::new(transport, session.clone()),
            bootstrap: SessionBootstrap::new(session.clone()),
            config,
            session,
            monitor,
        })
    }

    /// Stops timers and background tasks.
    pub fn shutdown(&self) {
        self.monitor.destroy();
        self.bootstrap.stop_periodic_refresh();
    }
}
