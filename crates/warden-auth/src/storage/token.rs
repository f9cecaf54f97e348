//! Access and refresh token storage trait.
//!
//! Tokens are keyed by the SHA-256 hash of their value (see
//! [`hash_token`](crate::types::hash_token)). Plaintext values never reach
//! storage.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::{AccessToken, RefreshToken};

/// Storage for issued tokens.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Persists an access token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Conflict` if a token with the same hash exists, or
    /// an error if the storage operation fails.
    async fn put_access_token(&self, token: &AccessToken) -> AuthResult<()>;

    /// Finds an access token by hash.
    ///
    /// Expired tokens are still returned; callers check expiry. Revoked
    /// tokens are not returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_access_token(&self, token_hash: &str) -> AuthResult<Option<AccessToken>>;

    /// Revokes an access token.
    ///
    /// # Returns
    ///
    /// Returns `true` if a token was revoked.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn revoke_access_token(&self, token_hash: &str) -> AuthResult<bool>;

    /// Persists a refresh token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Conflict` if a token with the same hash exists, or
    /// an error if the storage operation fails.
    async fn put_refresh_token(&self, token: &RefreshToken) -> AuthResult<()>;

    /// Finds a refresh token by hash, including revoked and expired ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_refresh_token(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>>;

    /// Marks a refresh token revoked.
    ///
    /// # Returns
    ///
    /// Returns `true` if the token existed and was not already revoked. Of
    /// concurrent revocations of one token exactly one returns `true`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn revoke_refresh_token(&self, token_hash: &str) -> AuthResult<bool>;
}
