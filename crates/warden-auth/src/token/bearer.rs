//! Bearer token authentication for protected resources.
//!
//! # Example
//!
//! ```ignore
//! let guard = ResourceGuard::new(token_storage, &config);
//!
//! let context = guard
//!     .authenticate_read_write(headers.authorization(), request.method())
//!     .await?;
//! println!("request by {}", context.client_id);
//! ```

use std::sync::Arc;

use serde::Serialize;
use time::OffsetDateTime;

use crate::AuthResult;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::storage::TokenStorage;
use crate::types::{ScopeSet, hash_token};

/// Authentication context of a request carrying a valid access token.
#[derive(Debug, Clone, Serialize)]
pub struct AccessContext {
    /// Client the token was issued to.
    pub client_id: String,

    /// Resource owner. `None` for client-credentials tokens.
    pub user_id: Option<String>,

    /// Granted scopes.
    pub scope: ScopeSet,

    /// When the token expires.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl AccessContext {
    /// Returns `true` if the token grants `scope`.
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.contains(scope)
    }

    /// Returns the resource owner, or the client for client-credentials tokens.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.user_id.as_deref().unwrap_or(&self.client_id)
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` if the header is missing, uses another
/// scheme, or carries an empty token.
pub fn extract_bearer(authorization: Option<&str>) -> AuthResult<&str> {
    let header = authorization.ok_or_else(|| AuthError::invalid_token("Missing Authorization header"))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::invalid_token("Authorization header must be 'Bearer <token>'"))
}

/// Validates bearer tokens against token storage.
pub struct ResourceGuard {
    token_storage: Arc<dyn TokenStorage>,
    read_scope: ScopeSet,
    write_scope: ScopeSet,
}

impl ResourceGuard {
    /// Creates a guard using the configured read and write scopes.
    #[must_use]
    pub fn new(token_storage: Arc<dyn TokenStorage>, config: &AuthConfig) -> Self {
        Self {
            token_storage,
            read_scope: ScopeSet::parse(&config.read_scope),
            write_scope: ScopeSet::parse(&config.write_scope),
        }
    }

    /// Authenticates a request and checks that `required` scopes were granted.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The header is missing or malformed, or the token is unknown,
    ///   revoked or expired (`InvalidToken`)
    /// - A required scope was not granted (`InsufficientScope`)
    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
        required: &ScopeSet,
    ) -> AuthResult<AccessContext> {
        // 1. Extract the token
        let token = extract_bearer(authorization)?;

        // 2. Look up by hash
        let record = self
            .token_storage
            .find_access_token(&hash_token(token))
            .await?
            .ok_or_else(|| {
                tracing::debug!("Unknown or revoked access token");
                AuthError::invalid_token("Unknown access token")
            })?;

        // 3. Check expiry
        if record.is_expired() {
            tracing::debug!(client_id = %record.client_id, "Access token expired");
            return Err(AuthError::invalid_token("Access token expired"));
        }

        // 4. Check scopes
        if !record.allows_scopes(required) {
            let missing = required.difference(&record.scope).join(" ");
            tracing::debug!(
                client_id = %record.client_id,
                missing = %missing,
                "Access token lacks required scope"
            );
            return Err(AuthError::insufficient_scope(missing));
        }

        tracing::debug!(
            client_id = %record.client_id,
            scope = %record.scope,
            "Access token validated"
        );

        Ok(AccessContext {
            client_id: record.client_id,
            user_id: record.user_id,
            scope: record.scope,
            expires_at: record.expires_at,
        })
    }

    /// Authenticates a request, requiring the read scope for safe methods
    /// (`GET`, `HEAD`, `OPTIONS`) and the write scope otherwise.
    ///
    /// # Errors
    ///
    /// See [`authenticate`](Self::authenticate).
    pub async fn authenticate_read_write(
        &self,
        authorization: Option<&str>,
        method: &str,
    ) -> AuthResult<AccessContext> {
        let required = if is_safe_method(method) {
            &self.read_scope
        } else {
            &self.write_scope
        };
        self.authenticate(authorization, required).await
    }
}

fn is_safe_method(method: &str) -> bool {
    ["GET", "HEAD", "OPTIONS"]
        .iter()
        .any(|safe| method.eq_ignore_ascii_case(safe))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccessToken, RefreshToken, generate_token_value};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::RwLock;
    use time::Duration;
    use tokio_test::block_on;
    use uuid::Uuid;

    #[derive(Default)]
    struct MockTokenStorage {
        access: RwLock<HashMap<String, AccessToken>>,
    }

    #[async_trait]
    impl TokenStorage for MockTokenStorage {
        async fn put_access_token(&self, token: &AccessToken) -> AuthResult<()> {
            self.access
                .write()
                .unwrap()
                .insert(token.token_hash.clone(), token.clone());
            Ok(())
        }

        async fn find_access_token(&self, token_hash: &str) -> AuthResult<Option<AccessToken>> {
            Ok(self.access.read().unwrap().get(token_hash).cloned())
        }

        async fn revoke_access_token(&self, token_hash: &str) -> AuthResult<bool> {
            Ok(self.access.write().unwrap().remove(token_hash).is_some())
        }

        async fn put_refresh_token(&self, _token: &RefreshToken) -> AuthResult<()> {
            Ok(())
        }

        async fn find_refresh_token(&self, _token_hash: &str) -> AuthResult<Option<RefreshToken>> {
            Ok(None)
        }

        async fn revoke_refresh_token(&self, _token_hash: &str) -> AuthResult<bool> {
            Ok(false)
        }
    }

    fn seed(storage: &MockTokenStorage, scope: &str, lifetime: Duration) -> String {
        let value = generate_token_value();
        let now = OffsetDateTime::now_utc();
        storage.access.write().unwrap().insert(
            hash_token(&value),
            AccessToken {
                id: Uuid::new_v4(),
                token_hash: hash_token(&value),
                client_id: "client".to_string(),
                user_id: Some("user-1".to_string()),
                scope: ScopeSet::parse(scope),
                created_at: now,
                expires_at: now + lifetime,
            },
        );
        value
    }

    fn create_guard() -> (ResourceGuard, Arc<MockTokenStorage>) {
        let storage = Arc::new(MockTokenStorage::default());
        (
            ResourceGuard::new(storage.clone(), &AuthConfig::default()),
            storage,
        )
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer(Some("Bearer abc")).unwrap(), "abc");
        assert!(extract_bearer(None).is_err());
        assert!(extract_bearer(Some("Bearer ")).is_err());
        assert!(extract_bearer(Some("Basic abc")).is_err());
    }

    #[tokio::test]
    async fn test_valid_token_with_scope() {
        let (guard, storage) = create_guard();
        let token = seed(&storage, "read write", Duration::hours(1));
        let header = format!("Bearer {token}");

        let context = guard
            .authenticate(Some(header.as_str()), &ScopeSet::parse("read"))
            .await
            .unwrap();
        assert_eq!(context.client_id, "client");
        assert_eq!(context.subject(), "user-1");
        assert!(context.has_scope("write"));

        // Reusable within validity
        assert!(
            guard
                .authenticate(Some(header.as_str()), &ScopeSet::new())
                .await
                .is_ok()
        );
    }

    #[test]
    fn test_malformed_header() {
        let (guard, _) = create_guard();
        let err = block_on(guard.authenticate(Some("Token abc"), &ScopeSet::new())).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let (guard, _) = create_guard();
        let err = guard
            .authenticate(Some("Bearer nope"), &ScopeSet::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));
    }

    #[tokio::test]
    async fn test_expired_token() {
        let (guard, storage) = create_guard();
        let token = seed(&storage, "read", Duration::seconds(-1));
        let header = format!("Bearer {token}");

        let err = guard
            .authenticate(Some(header.as_str()), &ScopeSet::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));
        assert_eq!(err.to_string(), "Invalid token: Access token expired");
    }

    #[tokio::test]
    async fn test_read_write_by_method() {
        let (guard, storage) = create_guard();
        let token = seed(&storage, "read", Duration::hours(1));
        let header = format!("Bearer {token}");

        assert!(
            guard
                .authenticate_read_write(Some(header.as_str()), "GET")
                .await
                .is_ok()
        );
        let err = guard
            .authenticate_read_write(Some(header.as_str()), "POST")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InsufficientScope { .. }));
    }
}
