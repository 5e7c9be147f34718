//! Cookie management types.
//!
//! The session client talks to a single backend origin, so the jar keys
//! cookies by name only. Expiry checks take the current time explicitly so
//! callers can drive them from an injected clock.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A single HTTP cookie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Path the cookie applies to.
    #[serde(default = "default_path")]
    pub path: String,
    /// Expiration time (None for session cookies).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
    /// `HttpOnly` flag.
    #[serde(default)]
    pub http_only: bool,
    /// Secure flag.
    #[serde(default)]
    pub secure: bool,
    /// `SameSite` attribute.
    #[serde(default)]
    pub same_site: SameSite,
}

fn default_path() -> String {
    "/".to_string()
}

/// `now` shifted by `secs`, clamped to the representable range.
fn expiry_after(now: DateTime<Utc>, secs: i64) -> DateTime<Utc> {
    TimeDelta::try_seconds(secs)
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(if secs < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}

impl Cookie {
    /// Create a new session cookie on path `/`.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: default_path(),
            expires: None,
            http_only: false,
            secure: false,
            same_site: SameSite::default(),
        }
    }

    /// Set the path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the expiration.
    #[must_use]
    pub const fn with_expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Expire `max_age` seconds after `now`.
    #[must_use]
    pub fn with_max_age(self, max_age_secs: i64, now: DateTime<Utc>) -> Self {
        self.with_expires(expiry_after(now, max_age_secs))
    }

    /// Set `HttpOnly` flag.
    #[must_use]
    pub const fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Set Secure flag.
    #[must_use]
    pub const fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set `SameSite` attribute.
    #[must_use]
    pub const fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    /// Check if the cookie is expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|exp| exp <= now)
    }

    /// Check if this is a session cookie (no expiration).
    #[must_use]
    pub const fn is_session(&self) -> bool {
        self.expires.is_none()
    }

    /// Format for Cookie header.
    #[must_use]
    pub fn to_cookie_header(&self) -> String {
        format!("{}={}", self.name, self.value)
    }

    /// Format as a `Set-Cookie` header value.
    #[must_use]
    pub fn to_set_cookie(&self, now: DateTime<Utc>) -> String {
        let mut header = format!("{}={}; Path={}", self.name, self.value, self.path);
        if let Some(expires) = self.expires {
            let max_age = (expires - now).num_seconds().max(0);
            let _ = write!(header, "; Max-Age={max_age}");
        }
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        if self.secure {
            header.push_str("; Secure");
        }
        let _ = write!(header, "; SameSite={}", self.same_site.display_name());
        header
    }

    /// Parse from a `Set-Cookie` header received at `now`.
    #[must_use]
    pub fn from_set_cookie(header: &str, now: DateTime<Utc>) -> Option<Self> {
        let mut parts = header.split(';');

        // First part is name=value
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let mut cookie = Self::new(name, value.trim());
        let mut max_age_seen = false;

        for part in parts {
            let part = part.trim();
            if let Some((attr, val)) = part.split_once('=') {
                let val = val.trim();
                match attr.trim().to_lowercase().as_str() {
                    "path" => cookie.path = val.to_string(),
                    // Max-Age wins over Expires regardless of order.
                    "expires" if !max_age_seen => {
                        if let Ok(exp) = DateTime::parse_from_rfc2822(val) {
                            cookie.expires = Some(exp.with_timezone(&Utc));
                        }
                    }
                    "max-age" => {
                        if let Ok(secs) = val.parse::<i64>() {
                            cookie.expires = Some(expiry_after(now, secs));
                            max_age_seen = true;
                        }
                    }
                    "samesite" => {
                        cookie.same_site = match val.to_lowercase().as_str() {
                            "strict" => SameSite::Strict,
                            "none" => SameSite::None,
                            _ => SameSite::Lax,
                        };
                    }
                    _ => {}
                }
            } else {
                match part.to_lowercase().as_str() {
                    "httponly" => cookie.http_only = true,
                    "secure" => cookie.secure = true,
                    _ => {}
                }
            }
        }

        Some(cookie)
    }
}

/// `SameSite` attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    /// Cookies are sent with all requests.
    None,
    /// Cookies are sent with top-level navigations and GET from third-party sites.
    #[default]
    Lax,
    /// Cookies are only sent in first-party context.
    Strict,
}

impl SameSite {
    /// Get human-readable name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Lax => "Lax",
            Self::Strict => "Strict",
        }
    }
}

/// Cookie jar for a single backend origin.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CookieJar {
    #[serde(default)]
    cookies: BTreeMap<String, Cookie>,
}

impl CookieJar {
    /// Create a new empty cookie jar.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cookies: BTreeMap::new(),
        }
    }

    /// Add a cookie, replacing any cookie with the same name.
    ///
    /// An already-expired cookie deletes the existing one, which is how
    /// servers clear cookies with `Max-Age=0`.
    pub fn add(&mut self, cookie: Cookie, now: DateTime<Utc>) {
        if cookie.is_expired_at(now) {
            self.cookies.remove(&cookie.name);
            return;
        }
        self.cookies.insert(cookie.name.clone(), cookie);
    }

    /// Get a live cookie by name.
    #[must_use]
    pub fn get(&self, name: &str, now: DateTime<Utc>) -> Option<&Cookie> {
        self.cookies.get(name).filter(|c| !c.is_expired_at(now))
    }

    /// Remove a cookie by name.
    pub fn remove(&mut self, name: &str) -> Option<Cookie> {
        self.cookies.remove(name)
    }

    /// Clear all cookies.
    pub fn clear(&mut self) {
        self.cookies.clear();
    }

    /// Remove expired cookies.
    pub fn cleanup_expired(&mut self, now: DateTime<Utc>) {
        self.cookies.retain(|_, c| !c.is_expired_at(now));
    }

    /// Get the total number of stored cookies, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Check if the jar is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Build the Cookie header value from live cookies.
    #[must_use]
    pub fn cookie_header(&self, now: DateTime<Utc>) -> Option<String> {
        let pairs: Vec<String> = self
            .cookies
            .values()
            .filter(|c| !c.is_expired_at(now))
            .map(Cookie::to_cookie_header)
            .collect();

        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }

    /// Process `Set-Cookie` header values from a response.
    pub fn process_set_cookies<'a>(
        &mut self,
        headers: impl IntoIterator<Item = &'a str>,
        now: DateTime<Utc>,
    ) {
        for value in headers {
            if let Some(cookie) = Cookie::from_set_cookie(value, now) {
                self.add(cookie, now);
            }
        }
    }
}
