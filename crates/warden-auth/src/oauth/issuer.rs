//! Authorization code and token minting.
//!
//! Values come from the thread-local CSPRNG (256 bits each). Storage enforces
//! uniqueness; a collision it reports is a generation failure and is surfaced
//! as an internal error rather than retried.

use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::AuthResult;
use crate::config::OAuthConfig;
use crate::error::AuthError;
use crate::oauth::authorize::ValidatedRequest;
use crate::storage::{GrantStorage, TokenStorage};
use crate::types::{
    AccessToken, AuthorizationGrant, RefreshToken, ScopeSet, generate_token_value, hash_token,
};

/// Freshly minted token values, returned to the client exactly once.
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    /// Bearer access token.
    pub access_token: String,

    /// Seconds until the access token expires.
    pub expires_in: u64,

    /// Granted scopes.
    pub scope: ScopeSet,

    /// Refresh token, for grants that carry one.
    pub refresh_token: Option<String>,
}

/// Mints authorization codes and tokens and persists their records.
pub struct TokenIssuer {
    grant_storage: Arc<dyn GrantStorage>,
    token_storage: Arc<dyn TokenStorage>,
    config: OAuthConfig,
}

impl TokenIssuer {
    /// Creates a new issuer.
    #[must_use]
    pub fn new(
        grant_storage: Arc<dyn GrantStorage>,
        token_storage: Arc<dyn TokenStorage>,
        config: &OAuthConfig,
    ) -> Self {
        Self {
            grant_storage,
            token_storage,
            config: config.clone(),
        }
    }

    /// Issues a single-use authorization code for an approved request.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if the generated code collides, or a
    /// storage error.
    pub async fn issue_code(
        &self,
        request: &ValidatedRequest,
        scope: ScopeSet,
    ) -> AuthResult<AuthorizationGrant> {
        let now = OffsetDateTime::now_utc();
        let grant = AuthorizationGrant {
            id: Uuid::new_v4(),
            code: AuthorizationGrant::generate_code(),
            client_id: request.client_id().to_string(),
            user_id: request.owner.id.clone(),
            redirect_uri: request.redirect_uri.clone(),
            redirect_uri_provided: request.redirect_uri_provided,
            scope,
            created_at: now,
            expires_at: expiry_after(now, self.config.authorization_code_lifetime)?,
            consumed_at: None,
        };

        self.grant_storage
            .put(&grant)
            .await
            .map_err(|e| collision("authorization code", e))?;

        tracing::info!(
            client_id = %grant.client_id,
            user_id = %grant.user_id,
            scope = %grant.scope,
            "Issued authorization code"
        );

        Ok(grant)
    }

    /// Issues an access token and, if `with_refresh` is set, a refresh token.
    ///
    /// `owner` is `None` only for client-credentials tokens, which never
    /// carry a refresh token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if a generated value collides or a
    /// refresh token is requested without an owner, or a storage error.
    /// Nothing stays stored on failure: if the refresh token cannot be
    /// written the access token is revoked again.
    pub async fn issue_tokens(
        &self,
        client_id: &str,
        owner: Option<&str>,
        scope: ScopeSet,
        with_refresh: bool,
    ) -> AuthResult<IssuedTokens> {
        let refresh_owner = match (with_refresh, owner) {
            (false, _) => None,
            (true, Some(owner)) => Some(owner),
            (true, None) => {
                return Err(AuthError::internal("Refresh tokens require a resource owner"));
            }
        };

        let now = OffsetDateTime::now_utc();
        let access_value = generate_token_value();
        let access_token = AccessToken {
            id: Uuid::new_v4(),
            token_hash: hash_token(&access_value),
            client_id: client_id.to_string(),
            user_id: owner.map(str::to_string),
            scope: scope.clone(),
            created_at: now,
            expires_at: expiry_after(now, self.config.access_token_lifetime)?,
        };
        let refresh = refresh_owner
            .map(|owner| -> AuthResult<(String, RefreshToken)> {
                let value = generate_token_value();
                let record = RefreshToken {
                    id: Uuid::new_v4(),
                    token_hash: hash_token(&value),
                    access_token_hash: access_token.token_hash.clone(),
                    client_id: client_id.to_string(),
                    user_id: owner.to_string(),
                    scope: scope.clone(),
                    created_at: now,
                    expires_at: expiry_after(now, self.config.refresh_token_lifetime)?,
                    revoked_at: None,
                };
                Ok((value, record))
            })
            .transpose()?;

        self.token_storage
            .put_access_token(&access_token)
            .await
            .map_err(|e| collision("access token", e))?;

        let refresh_token = match refresh {
            Some((value, record)) => {
                if let Err(e) = self.token_storage.put_refresh_token(&record).await {
                    // Never leave an access token without its refresh token
                    if let Err(rollback) = self
                        .token_storage
                        .revoke_access_token(&access_token.token_hash)
                        .await
                    {
                        tracing::error!(error = %rollback, "Failed to roll back access token");
                    }
                    return Err(collision("refresh token", e));
                }
                Some(value)
            }
            None => None,
        };

        tracing::info!(
            client_id = %client_id,
            user_id = owner.unwrap_or("-"),
            scope = %scope,
            refresh = refresh_token.is_some(),
            "Issued access token"
        );

        Ok(IssuedTokens {
            access_token: access_value,
            expires_in: self.config.access_token_lifetime.as_secs(),
            scope,
            refresh_token,
        })
    }
}

fn expiry_after(now: OffsetDateTime, lifetime: Duration) -> AuthResult<OffsetDateTime> {
    time::Duration::try_from(lifetime)
        .ok()
        .and_then(|lifetime| now.checked_add(lifetime))
        .ok_or_else(|| AuthError::configuration("Lifetime out of range"))
}

fn collision(kind: &str, error: AuthError) -> AuthError {
    match error {
        AuthError::Conflict { .. } => {
            tracing::error!(kind, "Generated value collided with an existing one");
            AuthError::internal(format!("Generated {} is not unique", kind))
        }
        other => other,
    }
}
