//! Session settings.
//!
//! Every field has a default so partial configuration files work.

use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Longest duration any setting accepts, in seconds (366 days).
pub const MAX_DURATION_SECS: u64 = 366 * 24 * 60 * 60;

/// Settings for token lifecycle management.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Base URL of the SGDIS backend.
    pub api_base_url: String,
    /// Path prefix of the authenticated API namespace.
    pub api_prefix: String,
    /// Path of the token refresh endpoint.
    pub refresh_path: String,
    /// Path of the current-user endpoint.
    pub current_user_path: String,
    /// Path of the login page.
    pub login_path: String,
    /// Routes that never require a session.
    pub public_routes: Vec<String>,
    /// A token this close to expiry counts as expired.
    pub expiry_leeway_secs: u64,
    /// Interval of the proactive refresh timer.
    pub refresh_interval_secs: u64,
    /// Grace period before redirecting when startup finds no session.
    pub bootstrap_grace_millis: u64,
    /// Lifetime of the cookie mirroring the access token.
    pub jwt_cookie_max_age_secs: u64,
    /// Timeout applied to each HTTP request.
    pub request_timeout_secs: u64,
    /// Inactivity monitor settings.
    pub inactivity: InactivityConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            api_prefix: "/api/".to_string(),
            refresh_path: "/api/v1/auth/token/refresh".to_string(),
            current_user_path: "/api/v1/users/me".to_string(),
            login_path: "/login".to_string(),
            public_routes: vec![
                "/login".to_string(),
                "/register".to_string(),
                "/forgot-password".to_string(),
                "/reset-password".to_string(),
            ],
            expiry_leeway_secs: 15,
            refresh_interval_secs: 60,
            bootstrap_grace_millis: 2000,
            jwt_cookie_max_age_secs: 900,
            request_timeout_secs: 30,
            inactivity: InactivityConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Leeway as a chrono delta, for comparisons against token expiry.
    #[must_use]
    pub fn expiry_leeway(&self) -> TimeDelta {
        i64::try_from(self.expiry_leeway_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }

    /// Interval of the proactive refresh timer.
    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Grace period before redirecting to login at startup.
    #[must_use]
    pub const fn bootstrap_grace(&self) -> Duration {
        Duration::from_millis(self.bootstrap_grace_millis)
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Max-Age of the mirrored access-token cookie.
    #[must_use]
    pub fn jwt_cookie_max_age(&self) -> i64 {
        i64::try_from(self.jwt_cookie_max_age_secs).unwrap_or(i64::MAX)
    }

    /// Whether `route` is a page that needs no session.
    ///
    /// Query strings and trailing slashes are ignored.
    #[must_use]
    pub fn is_public_route(&self, route: &str) -> bool {
        let path = route.split(['?', '#']).next().unwrap_or(route);
        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };
        self.public_routes.iter().any(|r| r == path)
    }

    /// The backend URL with a trailing slash, ready for joining paths.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidUrl`] if `api_base_url` does not parse.
    pub fn base_url(&self) -> DomainResult<Url> {
        let normalized = if self.api_base_url.ends_with('/') {
            self.api_base_url.clone()
        } else {
            format!("{}/", self.api_base_url)
        };
        Url::parse(&normalized).map_err(|e| DomainError::InvalidUrl {
            value: self.api_base_url.clone(),
            reason: e.to_string(),
        })
    }

    /// Whether a request target belongs to the authenticated API namespace.
    ///
    /// The target is resolved against the backend URL the same way the
    /// transport resolves it, so absolute URLs are judged by their path too.
    /// Other origins never qualify. The refresh endpoint itself is excluded
    /// so refreshing can never recurse into another refresh.
    #[must_use]
    pub fn is_authenticated_path(&self, target: &str) -> bool {
        let Ok(base) = self.base_url() else {
            return false;
        };
        let Ok(url) = base.join(target) else {
            return false;
        };
        if url.origin() != base.origin() {
            return false;
        }

        let path = url.path();
        path.starts_with(&self.api_prefix)
            && path.trim_end_matches('/') != self.refresh_path.trim_end_matches('/')
    }

    /// Check that durations are non-zero and bounded, paths are absolute and
    /// the backend URL parses.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> DomainResult<()> {
        for (field, value) in [
            ("api_prefix", &self.api_prefix),
            ("refresh_path", &self.refresh_path),
            ("current_user_path", &self.current_user_path),
            ("login_path", &self.login_path),
        ] {
            if !value.starts_with('/') {
                return Err(DomainError::InvalidPath {
                    field,
                    value: value.clone(),
                });
            }
        }

        self.base_url()?;

        for (field, value) in [
            ("refresh_interval_secs", self.refresh_interval_secs),
            ("jwt_cookie_max_age_secs", self.jwt_cookie_max_age_secs),
            ("request_timeout_secs", self.request_timeout_secs),
        ] {
            if value == 0 {
                return Err(DomainError::ZeroDuration(field));
            }
        }
        check_max("expiry_leeway_secs", self.expiry_leeway_secs, MAX_DURATION_SECS)?;
        check_max("refresh_interval_secs", self.refresh_interval_secs, MAX_DURATION_SECS)?;
        check_max("jwt_cookie_max_age_secs", self.jwt_cookie_max_age_secs, MAX_DURATION_SECS)?;
        check_max("request_timeout_secs", self.request_timeout_secs, MAX_DURATION_SECS)?;
        check_max("bootstrap_grace_millis", self.bootstrap_grace_millis, MAX_DURATION_SECS * 1000)?;

        self.inactivity.validate()
    }
}

/// Settings for the inactivity monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InactivityConfig {
    /// Quiet period before the warning appears.
    pub threshold_secs: u64,
    /// Length of the visible countdown.
    pub warning_secs: u64,
    /// Extra time the failsafe waits beyond the countdown.
    pub failsafe_margin_secs: u64,
    /// The countdown pulses during its final seconds.
    pub pulse_secs: u64,
    /// Delay between the logout notice and the redirect.
    pub redirect_delay_millis: u64,
}

impl Default for InactivityConfig {
    fn default() -> Self {
        Self {
            threshold_secs: 15 * 60,
            warning_secs: 60,
            failsafe_margin_secs: 5,
            pulse_secs: 5,
            redirect_delay_millis: 1500,
        }
    }
}

impl InactivityConfig {
    /// Quiet period before the warning appears.
    #[must_use]
    pub const fn threshold(&self) -> Duration {
        Duration::from_secs(self.threshold_secs)
    }

    /// Failsafe delay: countdown length plus margin.
    #[must_use]
    pub const fn failsafe(&self) -> Duration {
        Duration::from_secs(self.warning_secs.saturating_add(self.failsafe_margin_secs))
    }

    /// Delay between the logout notice and the redirect.
    #[must_use]
    pub const fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_millis)
    }

    /// Check that the thresholds are usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the threshold or warning duration is zero, or if
    /// any duration is longer than [`MAX_DURATION_SECS`].
    pub fn validate(&self) -> DomainResult<()> {
        if self.threshold_secs == 0 {
            return Err(DomainError::ZeroDuration("inactivity.threshold_secs"));
        }
        if self.warning_secs == 0 {
            return Err(DomainError::ZeroDuration("inactivity.warning_secs"));
        }
        check_max("inactivity.threshold_secs", self.threshold_secs, MAX_DURATION_SECS)?;
        check_max("inactivity.warning_secs", self.warning_secs, MAX_DURATION_SECS)?;
        check_max(
            "inactivity.failsafe_margin_secs",
            self.failsafe_margin_secs,
            MAX_DURATION_SECS,
        )?;
        check_max("inactivity.pulse_secs", self.pulse_secs, MAX_DURATION_SECS)?;
        check_max(
            "inactivity.redirect_delay_millis",
            self.redirect_delay_millis,
            MAX_DURATION_SECS * 1000,
        )
    }
}

const fn check_max(field: &'static str, value: u64, max: u64) -> DomainResult<()> {
    if value > max {
        Err(DomainError::DurationTooLong { field, max })
    } else {
        Ok(())
    }
}
