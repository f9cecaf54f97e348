//! In-memory authorization code storage.
//!
//! `consume` runs its checks and the consumed mark under the write lock of
//! the code's map shard, so concurrent redemptions of one code serialize and
//! only the first can succeed.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use time::OffsetDateTime;

use warden_auth::AuthResult;
use warden_auth::error::AuthError;
use warden_auth::storage::GrantStorage;
use warden_auth::types::AuthorizationGrant;

/// Authorization grants keyed by code.
#[derive(Debug, Default)]
pub struct InMemoryGrantStorage {
    grants: DashMap<String, AuthorizationGrant>,
}

impl InMemoryGrantStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes expired and consumed grants.
    ///
    /// # Returns
    ///
    /// Returns the number of grants removed.
    pub fn cleanup_expired(&self) -> u64 {
        let mut removed = 0;
        self.grants.retain(|_, grant| {
            let keep = grant.is_valid();
            if !keep {
                removed += 1;
            }
            keep
        });
        if removed > 0 {
            tracing::debug!(removed, "Removed stale authorization grants");
        }
        removed
    }

    /// Number of stored grants, including consumed ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// Returns `true` if no grant is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

#[async_trait]
impl GrantStorage for InMemoryGrantStorage {
    async fn put(&self, grant: &AuthorizationGrant) -> AuthResult<()> {
        match self.grants.entry(grant.code.clone()) {
            Entry::Occupied(_) => Err(AuthError::conflict("Authorization code already exists")),
            Entry::Vacant(slot) => {
                slot.insert(grant.clone());
                Ok(())
            }
        }
    }

    async fn consume(
        &self,
        code: &str,
        client_id: &str,
        redirect_uri: Option<&str>,
    ) -> AuthResult<AuthorizationGrant> {
        let mut grant = self
            .grants
            .get_mut(code)
            .ok_or_else(|| AuthError::invalid_grant("Unknown authorization code"))?;

        if grant.is_consumed() {
            tracing::warn!(
                grant_id = %grant.id,
                client_id = %grant.client_id,
                "Authorization code replayed"
            );
            return Err(AuthError::invalid_grant("Authorization code already used"));
        }
        if grant.is_expired() {
            return Err(AuthError::invalid_grant("Authorization code expired"));
        }
        if grant.client_id != client_id {
            return Err(AuthError::invalid_grant(
                "Authorization code was issued to another client",
            ));
        }
        if !grant.redirect_uri_matches(redirect_uri) {
            return Err(AuthError::invalid_grant("Redirect URI mismatch"));
        }

        grant.consumed_at = Some(OffsetDateTime::now_utc());
        Ok(grant.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use time::Duration;
    use uuid::Uuid;
    use warden_auth::types::ScopeSet;

    fn make_grant(lifetime: Duration, redirect_uri_provided: bool) -> AuthorizationGrant {
        let now = OffsetDateTime::now_utc();
        AuthorizationGrant {
            id: Uuid::new_v4(),
            code: AuthorizationGrant::generate_code(),
            client_id: "client".to_string(),
            user_id: "user".to_string(),
            redirect_uri: "http://localhost/cb".to_string(),
            redirect_uri_provided,
            scope: ScopeSet::parse("read write"),
            created_at: now,
            expires_at: now + lifetime,
            consumed_at: None,
        }
    }

    #[tokio::test]
    async fn test_consume_once() {
        let storage = InMemoryGrantStorage::new();
        let grant = make_grant(Duration::minutes(10), true);
        storage.put(&grant).await.unwrap();

        let consumed = storage
            .consume(&grant.code, "client", Some("http://localhost/cb"))
            .await
            .unwrap();
        assert!(consumed.is_consumed());

        let err = storage
            .consume(&grant.code, "client", Some("http://localhost/cb"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidGrant { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_code_conflicts() {
        let storage = InMemoryGrantStorage::new();
        let grant = make_grant(Duration::minutes(10), true);
        storage.put(&grant).await.unwrap();

        let err = storage.put(&grant).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_mismatch_does_not_consume() {
        let storage = InMemoryGrantStorage::new();
        let grant = make_grant(Duration::minutes(10), true);
        storage.put(&grant).await.unwrap();

        assert!(
            storage
                .consume(&grant.code, "other", Some("http://localhost/cb"))
                .await
                .is_err()
        );
        assert!(storage.consume(&grant.code, "client", None).await.is_err());
        assert!(
            storage
                .consume(&grant.code, "client", Some("http://localhost/cb"))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_omitted_redirect_when_not_provided() {
        let storage = InMemoryGrantStorage::new();
        let grant = make_grant(Duration::minutes(10), false);
        storage.put(&grant).await.unwrap();

        assert!(storage.consume(&grant.code, "client", None).await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_code() {
        let storage = InMemoryGrantStorage::new();
        let grant = make_grant(Duration::seconds(-1), true);
        storage.put(&grant).await.unwrap();

        let err = storage
            .consume(&grant.code, "client", Some("http://localhost/cb"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidGrant { .. }));
        assert_eq!(storage.cleanup_expired(), 1);
        assert!(storage.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_consume_single_winner() {
        let storage = Arc::new(InMemoryGrantStorage::new());
        let grant = make_grant(Duration::minutes(10), true);
        storage.put(&grant).await.unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let storage = Arc::clone(&storage);
                let code = grant.code.clone();
                tokio::spawn(async move {
                    storage
                        .consume(&code, "client", Some("http://localhost/cb"))
                        .await
                        .is_ok()
                })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn test_cleanup_removes_expired_and_consumed() {
        let storage = InMemoryGrantStorage::new();
        let live = make_grant(Duration::minutes(10), true);
        let used = make_grant(Duration::minutes(10), true);
        storage.put(&live).await.unwrap();
        storage.put(&used).await.unwrap();
        storage
            .put(&make_grant(Duration::seconds(-1), true))
            .await
            .unwrap();
        storage
            .consume(&used.code, "client", Some("http://localhost/cb"))
            .await
            .unwrap();

        assert_eq!(storage.cleanup_expired(), 2);
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.cleanup_expired(), 0);
    }
}
