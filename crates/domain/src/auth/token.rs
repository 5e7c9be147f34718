//! Access token decoding and expiry checks.
//!
//! Access tokens are JWTs issued by the SGDIS backend. The client never
//! verifies the signature; it only reads the `exp` claim to decide when a
//! refresh is due.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;

use crate::error::TokenError;

/// A decoded JWT access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    raw: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Decode a raw bearer string.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError`] if the token does not have three segments,
    /// the payload is not base64url-encoded JSON, or it has no numeric
    /// `exp` claim.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TokenError> {
        let raw = raw.into();
        let segments: Vec<&str> = raw.split('.').collect();
        if segments.len() != 3 {
            return Err(TokenError::WrongSegmentCount(segments.len()));
        }

        let payload = decode_payload(segments[1])?;
        let exp = payload
            .get("exp")
            .and_then(Value::as_f64)
            .ok_or(TokenError::MissingExpiry)?;

        #[allow(clippy::cast_possible_truncation)]
        let millis = (exp * 1000.0).round() as i64;
        let expires_at = DateTime::from_timestamp_millis(millis).ok_or(TokenError::MissingExpiry)?;

        Ok(Self { raw, expires_at })
    }

    /// Build an unsigned token carrying the given claims.
    ///
    /// Intended for fixtures and local development backends; the signature
    /// segment is a fixed placeholder.
    #[must_use]
    pub fn unsigned(claims: &Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
        format!("{header}.{payload}.unsigned")
    }

    /// The raw bearer string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// When the token expires.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the token is expired, or will be within `leeway`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>, leeway: TimeDelta) -> bool {
        // A deadline past the representable range is later than any expiry.
        now.checked_add_signed(leeway)
            .is_none_or(|deadline| deadline >= self.expires_at)
    }

    /// Whole seconds until expiry; negative once expired.
    #[must_use]
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds()
    }

    /// The `Authorization` header value for this token.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        bearer(&self.raw)
    }

    /// Short preview safe to log (first 8 chars + ...).
    #[must_use]
    pub fn preview(raw: &str) -> String {
        if raw.chars().count() > 12 {
            let head: String = raw.chars().take(8).collect();
            format!("{head}...")
        } else {
            raw.to_string()
        }
    }
}

/// Format a raw token as a bearer `Authorization` value.
#[must_use]
pub fn bearer(raw: &str) -> String {
    format!("Bearer {raw}")
}

/// Whether a cached token must be considered expired.
///
/// Absent, malformed and claim-less tokens all count as expired.
#[must_use]
pub fn is_expired(raw: Option<&str>, now: DateTime<Utc>, leeway: TimeDelta) -> bool {
    raw.map_or(true, |raw| {
        AccessToken::parse(raw).map_or(true, |token| token.is_expired_at(now, leeway))
    })
}

fn decode_payload(segment: &str) -> Result<Value, TokenError> {
    // Accept padded input and the standard alphabet as well.
    let normalized: String = segment
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();

    let bytes = URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|e| TokenError::InvalidBase64(e.to_string()))?;

    let payload: Value =
        serde_json::from_slice(&bytes).map_err(|e| TokenError::InvalidJson(e.to_string()))?;

    if payload.is_object() {
        Ok(payload)
    } else {
        Err(TokenError::InvalidJson("payload is not an object".to_string()))
    }
}

/// Status of the cached access token for display and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    /// No token is cached.
    NotAuthenticated,
    /// A token is cached but cannot be decoded.
    Malformed,
    /// Token is valid and outside the refresh leeway.
    Valid {
        /// Seconds until expiry.
        seconds_remaining: i64,
    },
    /// Token has not expired yet but is inside the refresh leeway.
    Expiring {
        /// Seconds until expiry.
        seconds_remaining: i64,
    },
    /// Token has expired.
    Expired,
}

impl TokenStatus {
    /// Evaluate a cached token at `now`.
    #[must_use]
    pub fn evaluate(raw: Option<&str>, now: DateTime<Utc>, leeway: TimeDelta) -> Self {
        let Some(raw) = raw else {
            return Self::NotAuthenticated;
        };
        let Ok(token) = AccessToken::parse(raw) else {
            return Self::Malformed;
        };

        let seconds_remaining = token.seconds_until_expiry(now);
        if token.is_expired_at(now, TimeDelta::zero()) {
            Self::Expired
        } else if token.is_expired_at(now, leeway) {
            Self::Expiring { seconds_remaining }
        } else {
            Self::Valid { seconds_remaining }
        }
    }

    /// Returns true if the token can be sent without refreshing first.
    #[must_use]
    pub const fn is_usable(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// Get a user-friendly display message.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::NotAuthenticated => "Not authenticated".to_string(),
            Self::Malformed => "Stored token is unreadable".to_string(),
            Self::Valid { seconds_remaining } => {
                let secs = *seconds_remaining;
                if secs > 3600 {
                    format!("Valid for {} hours", secs / 3600)
                } else if secs > 60 {
                    format!("Valid for {} minutes", secs / 60)
                } else {
                    format!("Valid for {secs} seconds")
                }
            }
            Self::Expiring { seconds_remaining } => {
                format!("Expiring in {seconds_remaining} seconds (will refresh)")
            }
            Self::Expired => "Expired".to_string(),
        }
    }
}
