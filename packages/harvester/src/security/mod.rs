//! Secret handling for tokens and API keys.

pub mod credentials;

pub use credentials::{AccessToken, SecretString};
