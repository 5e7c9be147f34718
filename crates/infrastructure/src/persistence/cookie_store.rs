//! Cookie jar adapter.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sgdis_application::ports::{Clock, CookieStore};
use sgdis_domain::auth::parse_cookie_pairs;
use sgdis_domain::{Cookie, CookieJar};

/// A [`CookieJar`] shared across the session, evaluated against a clock.
pub struct SharedCookieJar {
    jar: Mutex<CookieJar>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SharedCookieJar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedCookieJar")
            .field("cookies", &self.lock().len())
            .finish_non_exhaustive()
    }
}

impl SharedCookieJar {
    /// Creates an empty jar.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            jar: Mutex::new(CookieJar::new()),
            clock,
        }
    }

    /// Creates a jar seeded from a `Cookie:` header (`a=1; b=2`).
    ///
    /// Seeded cookies are session cookies on path `/`.
    #[must_use]
    pub fn from_cookie_header(header: &str, clock: Arc<dyn Clock>) -> Self {
        let jar = Self::new(clock);
        for (name, value) in parse_cookie_pairs(header) {
            jar.set(Cookie::new(name, value).with_path("/"));
        }
        jar
    }

    /// A live cookie with all its attributes.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<Cookie> {
        self.lock().get(name, self.clock.now()).cloned()
    }

    /// `Cookie:` header value for every live cookie.
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        self.lock().cookie_header(self.clock.now())
    }

    fn lock(&self) -> MutexGuard<'_, CookieJar> {
        self.jar.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CookieStore for SharedCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.cookie(name).map(|c| c.value)
    }

    fn set(&self, cookie: Cookie) {
        let now = self.clock.now();
        self.lock().add(cookie, now);
    }

    fn remove(&self, name: &str) {
        self.lock().remove(name);
    }

    fn apply_set_cookies(&self, headers: &[String]) {
        let now = self.clock.now();
        self.lock()
            .process_set_cookies(headers.iter().map(String::as_str), now);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, Utc};
    use pretty_assertions::assert_eq;
    use sgdis_application::ports::ManualClock;

    #[test]
    fn test_seeded_from_header() {
        let jar = SharedCookieJar::from_cookie_header(
            "refreshToken=r-1; theme=dark",
            Arc::new(ManualClock::default()),
        );
        assert_eq!(jar.get("refreshToken"), Some("r-1".to_string()));
        assert_eq!(jar.get("theme"), Some("dark".to_string()));
    }

    #[test]
    fn test_set_cookie_rotation_and_deletion() {
        let jar = SharedCookieJar::from_cookie_header(
            "refreshToken=r-1; jwt=old",
            Arc::new(ManualClock::default()),
        );

        jar.apply_set_cookies(&[
            "refreshToken=r-2; Path=/; HttpOnly; Max-Age=604800".to_string(),
            "jwt=; Path=/; Max-Age=0".to_string(),
        ]);

        assert_eq!(jar.get("refreshToken"), Some("r-2".to_string()));
        assert_eq!(jar.get("jwt"), None);
    }

    #[test]
    fn test_expired_cookie_is_invisible() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let jar = SharedCookieJar::new(clock.clone());
        jar.set(Cookie::new("jwt", "a.b.c").with_max_age(900, clock.now()));

        clock.advance(TimeDelta::seconds(899));
        assert!(jar.get("jwt").is_some());
        clock.advance(TimeDelta::seconds(1));
        assert!(jar.get("jwt").is_none());
        assert_eq!(jar.cookie_header(), None);
    }
}
