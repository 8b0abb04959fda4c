//! Credential handling with secure memory.
//!
//! Uses the `secrecy` crate to prevent accidental logging of access tokens
//! and API keys.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

/// A secret string that won't be logged or displayed.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    /// Create a new secret string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the secret value for use.
    ///
    /// Only call this when actually using the secret (e.g., in an API request).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A short-lived bearer token and the instant it stops being valid.
#[derive(Clone)]
pub struct AccessToken {
    pub token: SecretString,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(token: impl Into<SecretString>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// True while `now` is earlier than `margin` before expiry.
    pub fn is_fresh(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        now < self.expires_at - margin
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_secret_not_in_debug() {
        let secret = SecretString::new("ya29.super-secret-token");
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("ya29"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_secret_not_in_display() {
        let secret = SecretString::new("pcsk_secret");
        let display = format!("{}", secret);
        assert!(!display.contains("pcsk"));
        assert!(display.contains("[REDACTED]"));
    }

    #[test]
    fn test_expose_works() {
        let secret = SecretString::new("ya29.super-secret-token");
        assert_eq!(secret.expose(), "ya29.super-secret-token");
    }

    #[test]
    fn test_access_token_debug_redacts() {
        let expiry = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let token = AccessToken::new("ya29.secret", expiry);
        let debug = format!("{:?}", token);
        assert!(!debug.contains("ya29"));
        assert!(debug.contains("2026"));
    }

    #[test]
    fn test_freshness_margin() {
        let expiry = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let token = AccessToken::new("t", expiry);
        let margin = Duration::minutes(5);

        assert!(token.is_fresh(expiry - Duration::minutes(6), margin));
        assert!(!token.is_fresh(expiry - Duration::minutes(5), margin));
        assert!(!token.is_fresh(expiry + Duration::seconds(1), margin));
    }
}
