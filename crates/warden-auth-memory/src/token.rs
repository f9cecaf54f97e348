//! In-memory access and refresh token storage.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use time::OffsetDateTime;

use warden_auth::AuthResult;
use warden_auth::error::AuthError;
use warden_auth::storage::TokenStorage;
use warden_auth::types::{AccessToken, RefreshToken};

/// Tokens keyed by the hash of their value.
///
/// Revoked access tokens are removed outright; revoked refresh tokens stay
/// with `revoked_at` set so reuse can be detected.
#[derive(Debug, Default)]
pub struct InMemoryTokenStorage {
    access_tokens: DashMap<String, AccessToken>,
    refresh_tokens: DashMap<String, RefreshToken>,
}

impl InMemoryTokenStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes expired access and refresh tokens.
    ///
    /// # Returns
    ///
    /// Returns the number of tokens removed.
    pub fn cleanup_expired(&self) -> u64 {
        let mut removed = 0;
        self.access_tokens.retain(|_, token| {
            let keep = !token.is_expired();
            if !keep {
                removed += 1;
            }
            keep
        });
        self.refresh_tokens.retain(|_, token| {
            let keep = !token.is_expired();
            if !keep {
                removed += 1;
            }
            keep
        });
        if removed > 0 {
            tracing::debug!(removed, "Removed expired tokens");
        }
        removed
    }

    /// Number of live access tokens.
    #[must_use]
    pub fn access_token_count(&self) -> usize {
        self.access_tokens.len()
    }
}

#[async_trait]
impl TokenStorage for InMemoryTokenStorage {
    async fn put_access_token(&self, token: &AccessToken) -> AuthResult<()> {
        match self.access_tokens.entry(token.token_hash.clone()) {
            Entry::Occupied(_) => Err(AuthError::conflict("Access token already exists")),
            Entry::Vacant(slot) => {
                slot.insert(token.clone());
                Ok(())
            }
        }
    }

    async fn find_access_token(&self, token_hash: &str) -> AuthResult<Option<AccessToken>> {
        Ok(self
            .access_tokens
            .get(token_hash)
            .map(|entry| entry.value().clone()))
    }

    async fn revoke_access_token(&self, token_hash: &str) -> AuthResult<bool> {
        Ok(self.access_tokens.remove(token_hash).is_some())
    }

    async fn put_refresh_token(&self, token: &RefreshToken) -> AuthResult<()> {
        match self.refresh_tokens.entry(token.token_hash.clone()) {
            Entry::Occupied(_) => Err(AuthError::conflict("Refresh token already exists")),
            Entry::Vacant(slot) => {
                slot.insert(token.clone());
                Ok(())
            }
        }
    }

    async fn find_refresh_token(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>> {
        Ok(self
            .refresh_tokens
            .get(token_hash)
            .map(|entry| entry.value().clone()))
    }

    async fn revoke_refresh_token(&self, token_hash: &str) -> AuthResult<bool> {
        let Some(mut token) = self.refresh_tokens.get_mut(token_hash) else {
            return Ok(false);
        };
        if token.revoked_at.is_some() {
            return Ok(false);
        }
        token.revoked_at = Some(OffsetDateTime::now_utc());
        Ok(true)
    }
}
