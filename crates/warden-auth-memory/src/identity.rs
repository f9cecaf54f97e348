//! In-memory identity provider for the password grant.

use async_trait::async_trait;
use dashmap::DashMap;

use warden_auth::AuthResult;
use warden_auth::error::AuthError;
use warden_auth::identity::{IdentityProvider, ResourceOwner};
use warden_auth::secret::{hash_secret, verify_secret};

#[derive(Debug, Clone)]
struct UserRecord {
    user_id: String,
    password_hash: String,
}

/// Username/password accounts with Argon2-hashed passwords.
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    users: DashMap<String, UserRecord>,
}

impl InMemoryIdentityProvider {
    /// Creates a provider with no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if hashing the password fails.
    pub fn add_user(
        &self,
        username: impl Into<String>,
        user_id: impl Into<String>,
        password: &str,
    ) -> AuthResult<()> {
        let password_hash = hash_secret(password).map_err(|e| {
            tracing::error!(error = %e, "Failed to hash password");
            AuthError::internal("Failed to hash password")
        })?;
        self.users.insert(
            username.into(),
            UserRecord {
                user_id: user_id.into(),
                password_hash,
            },
        );
        Ok(())
    }

    /// Removes an account.
    pub fn remove_user(&self, username: &str) -> bool {
        self.users.remove(username).is_some()
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> AuthResult<Option<ResourceOwner>> {
        let Some(record) = self.users.get(username).map(|entry| entry.value().clone()) else {
            tracing::debug!("Unknown username in password grant");
            return Ok(None);
        };

        let matches = verify_secret(password, &record.password_hash).map_err(|e| {
            tracing::error!(error = %e, "Stored password hash is malformed");
            AuthError::internal("Malformed password hash")
        })?;

        Ok(matches.then(|| ResourceOwner::new(record.user_id)))
    }
}
