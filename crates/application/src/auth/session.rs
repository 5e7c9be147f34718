//! Access-token lifecycle with single-flight refresh.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use sgdis_domain::{AccessToken, SessionConfig, TokenStatus, is_expired};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{Credentials, LogoutReason, SessionTerminator};
use crate::ports::{Clock, TokenRefresher};

type RefreshFlight = Shared<BoxFuture<'static, bool>>;

/// Keeps the cached access token usable.
///
/// Cheap to clone; clones share the credential stores and the in-flight
/// refresh. At most one refresh request is outstanding at any time: callers
/// arriving while one is pending await the same future and observe the same
/// result.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    config: SessionConfig,
    credentials: Credentials,
    refresher: Arc<dyn TokenRefresher>,
    clock: Arc<dyn Clock>,
    terminator: Arc<SessionTerminator>,
    in_flight: Mutex<Option<RefreshFlight>>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("credentials", &self.inner.credentials)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates a session manager.
    #[must_use]
    pub fn new(
        config: SessionConfig,
        credentials: Credentials,
        refresher: Arc<dyn TokenRefresher>,
        clock: Arc<dyn Clock>,
        terminator: Arc<SessionTerminator>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                credentials,
                refresher,
                clock,
                terminator,
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Settings this manager runs with.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// The credential write path.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.inner.credentials
    }

    /// The shared logout path.
    #[must_use]
    pub fn terminator(&self) -> &Arc<SessionTerminator> {
        &self.inner.terminator
    }

    /// Whether the cached token must be refreshed before use.
    ///
    /// Absent and undecodable tokens count as expired, as does a token
    /// inside the expiry leeway.
    #[must_use]
    pub fn is_token_expired(&self) -> bool {
        is_expired(
            self.inner.credentials.access_token().as_deref(),
            self.inner.clock.now(),
            self.inner.config.expiry_leeway(),
        )
    }

    /// Status of the cached token.
    #[must_use]
    pub fn token_status(&self) -> TokenStatus {
        TokenStatus::evaluate(
            self.inner.credentials.access_token().as_deref(),
            self.inner.clock.now(),
            self.inner.config.expiry_leeway(),
        )
    }

    /// Refreshes the access token.
    ///
    /// Joins a pending refresh if there is one. Otherwise, unless `force`
    /// is set, a still-valid token short-circuits to `true`. Returns whether
    /// a usable token is now stored.
    pub async fn refresh_token(&self, force: bool) -> bool {
        let flight = {
            let mut slot = self.inner.in_flight.lock().await;
            match slot.as_ref() {
                Some(flight) => {
                    debug!("Joining in-flight token refresh");
                    flight.clone()
                }
                None => {
                    if !force && !self.is_token_expired() {
                        debug!("Access token still valid; refresh skipped");
                        return true;
                    }
                    let inner = Arc::clone(&self.inner);
                    let flight = async move { inner.exchange().await }.boxed().shared();
                    *slot = Some(flight.clone());
                    flight
                }
            }
        };

        let refreshed = flight.clone().await;

        let mut slot = self.inner.in_flight.lock().await;
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&flight)) {
            *slot = None;
        }
        refreshed
    }

    /// Returns a token that is safe to send, refreshing if needed.
    pub async fn get_valid_token(&self) -> Option<String> {
        if let Some(token) = self.inner.credentials.access_token() {
            if !self.is_token_expired() {
                return Some(token);
            }
        }

        if self.refresh_token(true).await {
            self.inner.credentials.access_token()
        } else {
            None
        }
    }

    /// Ends the session at the user's request.
    pub async fn logout(&self) {
        self.inner
            .terminator
            .terminate(LogoutReason::UserRequested)
            .await;
    }
}

impl Inner {
    async fn exchange(&self) -> bool {
        let Some(refresh_token) = self.credentials.refresh_token() else {
            debug!("No refresh token cookie; dropping cached access token");
            self.credentials.clear_access_token();
            return false;
        };

        match self.refresher.refresh(&refresh_token).await {
            Ok(refreshed) => {
                self.credentials.apply_set_cookies(&refreshed.set_cookies);
                self.credentials.store_access_token(&refreshed.access_token);
                info!(
                    token = %AccessToken::preview(&refreshed.access_token),
                    "Access token refreshed"
                );
                true
            }
            Err(e) if e.is_terminal() => {
                warn!(error = %e, "Refresh token rejected; clearing credentials");
                self.credentials.clear_all();
                false
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed; keeping credentials");
                false
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ports::{RefreshError, RefreshedToken};
    use crate::testing::{Harness, ScriptedRefresher, token_expiring_in};
    use chrono::{TimeDelta, Utc};
    use futures::future::join_all;
    use pretty_assertions::assert_eq;
    use sgdis_domain::ACCESS_TOKEN_COOKIE;

    #[tokio::test]
    async fn test_valid_token_is_not_expired() {
        let h = Harness::new(ScriptedRefresher::new(Vec::new()));
        let token = token_expiring_in(h.now(), 3600);
        let h = h.with_access_token(&token);

        assert!(!h.session.is_token_expired());
        assert_eq!(h.session.get_valid_token().await, Some(token));
        assert_eq!(h.refresher.calls(), 0);
    }

    #[tokio::test]
    async fn test_token_inside_leeway_counts_as_expired() {
        let h = Harness::new(ScriptedRefresher::new(Vec::new()));
        let token = token_expiring_in(h.now(), 20);
        let h = h.with_access_token(&token);
        assert!(!h.session.is_token_expired());

        h.clock.advance(TimeDelta::seconds(6));
        assert!(h.session.is_token_expired());
        assert!(matches!(
            h.session.token_status(),
            TokenStatus::Expiring { .. }
        ));
    }

    #[tokio::test]
    async fn test_malformed_token_counts_as_expired() {
        let h = Harness::new(ScriptedRefresher::new(Vec::new())).with_access_token("abc.def");
        assert!(h.session.is_token_expired());
        assert_eq!(h.session.token_status(), TokenStatus::Malformed);
    }

    #[tokio::test]
    async fn test_unforced_refresh_skips_valid_token() {
        let h = Harness::new(ScriptedRefresher::new(Vec::new()));
        let token = token_expiring_in(h.now(), 3600);
        let h = h.with_access_token(&token);

        assert!(h.session.refresh_token(false).await);
        assert_eq!(h.refresher.calls(), 0);
    }

    #[tokio::test]
    async fn test_successful_refresh_writes_store_and_cookie() {
        let fresh = token_expiring_in(Utc::now(), 900);
        let h = Harness::new(ScriptedRefresher::issuing(&fresh)).with_refresh_cookie("r-1");

        assert!(h.session.refresh_token(true).await);

        assert_eq!(h.refresher.seen(), vec!["r-1".to_string()]);
        assert_eq!(h.stored_token(), Some(fresh.clone()));
        let cookie = h.cookies.cookie(ACCESS_TOKEN_COOKIE).unwrap();
        assert_eq!(cookie.value, fresh);
        assert_eq!(cookie.path, "/");
        assert_eq!(cookie.same_site, sgdis_domain::SameSite::Strict);
        assert!(!h.session.is_token_expired());
    }

    #[tokio::test]
    async fn test_refresh_applies_rotated_refresh_cookie() {
        let fresh = token_expiring_in(Utc::now(), 900);
        let refresher = ScriptedRefresher::new(vec![Ok(RefreshedToken {
            access_token: fresh,
            set_cookies: vec!["refreshToken=r-2; Path=/; HttpOnly".to_string()],
        })]);
        let h = Harness::new(refresher).with_refresh_cookie("r-1");

        assert!(h.session.refresh_token(true).await);
        assert_eq!(h.credentials.refresh_token(), Some("r-2".to_string()));
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_refresh() {
        let fresh = token_expiring_in(Utc::now(), 900);
        let h = Harness::new(ScriptedRefresher::issuing(&fresh)).with_refresh_cookie("r-1");

        let refreshes = (0..5).map(|_| h.session.refresh_token(true));
        let tokens = (0..5).map(|_| h.session.get_valid_token());
        let (refreshed, tokens) = tokio::join!(join_all(refreshes), join_all(tokens));

        assert_eq!(h.refresher.calls(), 1);
        assert!(refreshed.into_iter().all(|ok| ok));
        assert!(tokens.into_iter().all(|t| t.as_deref() == Some(fresh.as_str())));
    }

    #[tokio::test]
    async fn test_sequential_refreshes_each_hit_the_backend() {
        let first = token_expiring_in(Utc::now(), 900);
        let second = token_expiring_in(Utc::now(), 1800);
        let refresher = ScriptedRefresher::new(vec![
            Ok(RefreshedToken {
                access_token: first,
                set_cookies: Vec::new(),
            }),
            Ok(RefreshedToken {
                access_token: second.clone(),
                set_cookies: Vec::new(),
            }),
        ]);
        let h = Harness::new(refresher).with_refresh_cookie("r-1");

        assert!(h.session.refresh_token(true).await);
        assert!(h.session.refresh_token(true).await);
        assert_eq!(h.refresher.calls(), 2);
        assert_eq!(h.stored_token(), Some(second));
    }

    #[tokio::test]
    async fn test_missing_refresh_cookie_clears_access_token() {
        let h = Harness::new(ScriptedRefresher::new(Vec::new()));
        let stale = token_expiring_in(h.now(), -60);
        let h = h.with_access_token(&stale);

        assert!(!h.session.refresh_token(false).await);
        assert_eq!(h.refresher.calls(), 0);
        assert_eq!(h.stored_token(), None);
        assert!(h.navigator.visits().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_refresh_clears_everything() {
        let h = Harness::new(ScriptedRefresher::new(vec![Err(RefreshError::Rejected {
            status: 403,
        })]));
        let stale = token_expiring_in(h.now(), -60);
        let h = h.with_refresh_cookie("r-1");
        h.credentials.store_access_token(&stale);

        assert!(!h.session.refresh_token(true).await);
        assert_eq!(h.stored_token(), None);
        assert!(h.cookies.cookie(ACCESS_TOKEN_COOKIE).is_none());
        assert!(h.credentials.refresh_token().is_none());

        assert_eq!(h.session.get_valid_token().await, None);
        assert_eq!(h.refresher.calls(), 1);
    }

    #[tokio::test]
    async fn test_transient_failures_keep_credentials() {
        for failure in [
            RefreshError::Server { status: 500 },
            RefreshError::Network("connection reset".to_string()),
            RefreshError::MalformedResponse("no token field".to_string()),
        ] {
            let h = Harness::new(ScriptedRefresher::new(vec![Err(failure)]));
            let stale = token_expiring_in(h.now(), -60);
            let h = h.with_access_token(&stale).with_refresh_cookie("r-1");

            assert!(!h.session.refresh_token(true).await);
            assert_eq!(h.stored_token(), Some(stale));
            assert_eq!(h.credentials.refresh_token(), Some("r-1".to_string()));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_ends_session() {
        let h = Harness::new(ScriptedRefresher::new(Vec::new()));
        let token = token_expiring_in(h.now(), 600);
        let h = h.with_access_token(&token).with_refresh_cookie("r-1");

        h.session.logout().await;

        assert_eq!(h.session.token_status(), TokenStatus::NotAuthenticated);
        assert_eq!(h.navigator.visits(), vec!["/login".to_string()]);
    }
}
