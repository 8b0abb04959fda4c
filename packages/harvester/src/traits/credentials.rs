//! Credential source for the embedding provider.

use async_trait::async_trait;

use crate::error::CredentialResult;
use crate::security::AccessToken;

/// Mints fresh access tokens.
///
/// Implementations differ only in where the signing material comes from
/// (a key file, environment variables, a static token in tests). Caching is
/// not their concern; see [`crate::pipeline::TokenCache`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Obtain a new token and its declared expiry.
    async fn refresh(&self) -> CredentialResult<AccessToken>;
}
