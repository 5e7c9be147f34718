//! The single write path for session credentials.

use std::sync::Arc;

use sgdis_domain::{
    ACCESS_TOKEN_COOKIE, ACCESS_TOKEN_KEY, AccessToken, Cookie, REFRESH_TOKEN_COOKIE, SameSite,
};
use tracing::{debug, warn};

use crate::ports::{Clock, CookieStore, KeyValueStore};

/// Access and refresh credentials spread over the key-value store and the
/// cookie jar.
///
/// The access token is written to both stores together: the `jwt` key and a
/// short-lived `jwt` cookie mirror. The refresh token is only ever read from
/// its cookie; the backend owns its lifetime.
#[derive(Clone)]
pub struct Credentials {
    store: Arc<dyn KeyValueStore>,
    cookies: Arc<dyn CookieStore>,
    clock: Arc<dyn Clock>,
    cookie_max_age_secs: i64,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("cookie_max_age_secs", &self.cookie_max_age_secs)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    /// Creates credentials over the given stores.
    #[must_use]
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        cookies: Arc<dyn CookieStore>,
        clock: Arc<dyn Clock>,
        cookie_max_age_secs: i64,
    ) -> Self {
        Self {
            store,
            cookies,
            clock,
            cookie_max_age_secs,
        }
    }

    /// The cached access token, if any.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.store
            .get(ACCESS_TOKEN_KEY)
            .filter(|token| !token.is_empty())
    }

    /// The refresh token cookie, if any.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.cookies
            .get(REFRESH_TOKEN_COOKIE)
            .filter(|token| !token.is_empty())
    }

    /// Stores a new access token in both places.
    ///
    /// A persistence failure is logged; the cookie mirror is still written.
    pub fn store_access_token(&self, token: &str) {
        if let Err(e) = self.store.set(ACCESS_TOKEN_KEY, token) {
            warn!(error = %e, "Failed to persist access token");
        }

        let cookie = Cookie::new(ACCESS_TOKEN_COOKIE, token)
            .with_path("/")
            .with_max_age(self.cookie_max_age_secs, self.clock.now())
            .with_same_site(SameSite::Strict);
        self.cookies.set(cookie);

        debug!(token = %AccessToken::preview(token), "Access token stored");
    }

    /// Removes the access token and its cookie mirror.
    pub fn clear_access_token(&self) {
        if let Err(e) = self.store.remove(ACCESS_TOKEN_KEY) {
            warn!(error = %e, "Failed to remove persisted access token");
        }
        self.cookies.remove(ACCESS_TOKEN_COOKIE);
    }

    /// Removes every session credential, refresh token included.
    pub fn clear_all(&self) {
        self.clear_access_token();
        self.cookies.remove(REFRESH_TOKEN_COOKIE);
        debug!("Session credentials cleared");
    }

    /// Applies `Set-Cookie` headers returned by the backend.
    pub fn apply_set_cookies(&self, headers: &[String]) {
        if !headers.is_empty() {
            self.cookies.apply_set_cookies(headers);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use crate::testing::{Harness, ScriptedRefresher};
    use chrono::TimeDelta;
    use pretty_assertions::assert_eq;
    use sgdis_domain::{ACCESS_TOKEN_COOKIE, SameSite};

    #[test]
    fn test_store_writes_both_locations() {
        let h = Harness::new(ScriptedRefresher::new(Vec::new()));

        h.credentials.store_access_token("a.b.c");

        assert_eq!(h.credentials.access_token(), Some("a.b.c".to_string()));
        let cookie = h.cookies.cookie(ACCESS_TOKEN_COOKIE).unwrap();
        assert_eq!(cookie.value, "a.b.c");
        assert_eq!(cookie.same_site, SameSite::Strict);
        assert_eq!(cookie.expires, Some(h.now() + TimeDelta::seconds(900)));
    }

    #[test]
    fn test_cookie_mirror_expires_with_max_age() {
        let h = Harness::new(ScriptedRefresher::new(Vec::new()));
        h.credentials.store_access_token("a.b.c");

        h.clock.advance(TimeDelta::seconds(901));

        assert!(h.cookies.cookie(ACCESS_TOKEN_COOKIE).is_none());
        assert_eq!(h.credentials.access_token(), Some("a.b.c".to_string()));
    }

    #[test]
    fn test_clear_access_token_keeps_refresh_cookie() {
        let h = Harness::new(ScriptedRefresher::new(Vec::new())).with_refresh_cookie("r-1");
        h.credentials.store_access_token("a.b.c");

        h.credentials.clear_access_token();
        assert_eq!(h.credentials.access_token(), None);
        assert_eq!(h.credentials.refresh_token(), Some("r-1".to_string()));

        h.credentials.clear_all();
        assert_eq!(h.credentials.refresh_token(), None);
    }

    #[test]
    fn test_empty_values_count_as_absent() {
        let h = Harness::new(ScriptedRefresher::new(Vec::new()))
            .with_access_token("")
            .with_refresh_cookie("");
        assert_eq!(h.credentials.access_token(), None);
        assert_eq!(h.credentials.refresh_token(), None);
    }
}
