//! Short-lived access token caching.

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::CredentialResult;
use crate::security::{AccessToken, SecretString};
use crate::traits::credentials::CredentialProvider;

/// Tokens are refreshed this many minutes before their declared expiry.
pub const REFRESH_MARGIN_MINUTES: i64 = 5;

/// Source of the current time, injectable for tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Caches one access token and refreshes it near expiry.
///
/// Purely an optimization: an empty or stale cache just triggers a refresh.
pub struct TokenCache<P> {
    provider: P,
    margin: Duration,
    cached: Mutex<Option<AccessToken>>,
}

impl<P: CredentialProvider> TokenCache<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            margin: Duration::minutes(REFRESH_MARGIN_MINUTES),
            cached: Mutex::new(None),
        }
    }

    /// Override the refresh margin.
    pub fn with_margin(mut self, margin: Duration) -> Self {
        self.margin = margin;
        self
    }

    /// A token valid at `now`, refreshing through the provider if needed.
    pub async fn get_token(&self, now: DateTime<Utc>) -> CredentialResult<SecretString> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_fresh(now, self.margin) {
                return Ok(token.token.clone());
            }
        }

        debug!("Refreshing access token");
        let fresh = self.provider.refresh().await?;
        debug!(expires_at = %fresh.expires_at, "Access token refreshed");

        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }

    /// Drop the cached token so the next call refreshes.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}
