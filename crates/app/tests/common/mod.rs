//! Shared fixtures for the integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::json;
use sgdis::{AppContext, Backing, Frontend};
use sgdis_application::ports::{
    AlertError, AlertSound, Notice, Notifier, Scheduler, WarningView, WarningViewError,
};
use sgdis_application::VirtualScheduler;
use sgdis_domain::{AccessToken, CountdownStyle, SessionConfig};
use sgdis_infrastructure::{
    ConsoleNavigator, MemoryKeyValueStore, SharedCookieJar, SystemClock,
};
use tokio::sync::watch;

pub const REFRESH_PATH: &str = "/api/v1/auth/token/refresh";

pub fn token_expiring_in(secs: i64) -> String {
    AccessToken::unsigned(&json!({ "sub": "7", "exp": Utc::now().timestamp() + secs }))
}

#[derive(Default)]
pub struct Notices(Mutex<Vec<Notice>>);

impl Notices {
    pub fn all(&self) -> Vec<Notice> {
        self.0.lock().unwrap().clone()
    }
}

impl Notifier for Notices {
    fn notify(&self, notice: Notice) {
        self.0.lock().unwrap().push(notice);
    }
}

#[derive(Default)]
pub struct Countdown(Mutex<Vec<u64>>);

impl Countdown {
    pub fn shown(&self) -> Vec<u64> {
        self.0.lock().unwrap().clone()
    }
}

impl WarningView for Countdown {
    fn show(&self, remaining: u64, _style: CountdownStyle) -> Result<(), WarningViewError> {
        self.0.lock().unwrap().push(remaining);
        Ok(())
    }

    fn update(&self, remaining: u64, _style: CountdownStyle) {
        self.0.lock().unwrap().push(remaining);
    }

    fn hide(&self) {}
}

pub struct Silent;

impl AlertSound for Silent {
    fn play(&self) -> Result<(), AlertError> {
        Ok(())
    }
}

pub struct Client {
    pub ctx: AppContext,
    pub store: Arc<MemoryKeyValueStore>,
    pub cookies: Arc<SharedCookieJar>,
    pub scheduler: Arc<VirtualScheduler>,
    pub notices: Arc<Notices>,
    pub countdown: Arc<Countdown>,
    pub route: watch::Receiver<String>,
}

impl Client {
    pub fn new(base_url: &str, cookie_header: &str) -> Self {
        let config = SessionConfig {
            api_base_url: base_url.to_string(),
            request_timeout_secs: 5,
            ..SessionConfig::default()
        };
        Self::with_config(config, cookie_header)
    }

    pub fn with_config(mut config: SessionConfig, cookie_header: &str) -> Self {
        config.inactivity.redirect_delay_millis = 10;

        let clock = Arc::new(SystemClock);
        let store = Arc::new(MemoryKeyValueStore::new());
        let cookies = Arc::new(SharedCookieJar::from_cookie_header(
            cookie_header,
            clock.clone(),
        ));
        let scheduler = Arc::new(VirtualScheduler::new());
        let notices = Arc::new(Notices::default());
        let countdown = Arc::new(Countdown::default());
        let (navigator, route) = ConsoleNavigator::new("/inventories");

        let ctx = AppContext::build(
            config,
            Backing {
                store: store.clone(),
                cookies: cookies.clone(),
                clock,
                scheduler: scheduler.clone() as Arc<dyn Scheduler>,
            },
            Frontend {
                notifier: notices.clone(),
                navigator: Arc::new(navigator),
                warning: countdown.clone(),
                alert: Arc::new(Silent),
            },
        )
        .unwrap();

        Self {
            ctx,
            store,
            cookies,
            scheduler,
            notices,
            countdown,
            route,
        }
    }

    pub fn advance(&self, by: std::time::Duration) {
        self.scheduler.advance(by, |timer| self.ctx.monitor.fire(timer));
    }
}
