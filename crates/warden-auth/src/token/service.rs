//! Token endpoint service.
//!
//! Handles the grants redeemed at the token endpoint:
//!
//! - `authorization_code` - code exchange
//! - `refresh_token` - refresh with optional rotation
//! - `client_credentials` - confidential clients acting on their own behalf
//! - `password` - resource owner credentials, verified by an [`IdentityProvider`]
//!
//! and token revocation (RFC 7009).
//!
//! # Usage
//!
//! ```ignore
//! let service = TokenService::new(clients, grants, tokens, issuer, &config)
//!     .with_identity_provider(identity);
//!
//! let response = service.token(&request, authorization_header).await?;
//! ```

use std::sync::Arc;

use crate::AuthResult;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::identity::IdentityProvider;
use crate::oauth::client_auth::{ClientCredentials, authenticate_client};
use crate::oauth::issuer::{IssuedTokens, TokenIssuer};
use crate::oauth::token::{TokenRequest, TokenResponse};
use crate::oauth::validator::RequestValidator;
use crate::storage::{ClientRegistry, GrantStorage, TokenStorage};
use crate::token::revocation::{RevocationRequest, TokenTypeHint};
use crate::types::{Application, GrantType, ScopeSet, hash_token};

/// Token endpoint service.
pub struct TokenService {
    client_registry: Arc<dyn ClientRegistry>,
    grant_storage: Arc<dyn GrantStorage>,
    token_storage: Arc<dyn TokenStorage>,
    identity_provider: Option<Arc<dyn IdentityProvider>>,
    issuer: Arc<TokenIssuer>,
    validator: RequestValidator,
    rotate_refresh_tokens: bool,
}

impl TokenService {
    /// Creates a new token service without password-grant support.
    #[must_use]
    pub fn new(
        client_registry: Arc<dyn ClientRegistry>,
        grant_storage: Arc<dyn GrantStorage>,
        token_storage: Arc<dyn TokenStorage>,
        issuer: Arc<TokenIssuer>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            client_registry,
            grant_storage,
            token_storage,
            identity_provider: None,
            issuer,
            validator: RequestValidator::new(config),
            rotate_refresh_tokens: config.oauth.refresh_token_rotation,
        }
    }

    /// Enables the password grant.
    #[must_use]
    pub fn with_identity_provider(mut self, identity_provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity_provider = Some(identity_provider);
        self
    }

    /// Authenticates the client and dispatches on `grant_type`.
    ///
    /// `authorization` is the raw `Authorization` header, if present.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidClient` if client authentication fails,
    /// `AuthError::UnsupportedGrantType` for unknown grant types, or any
    /// error of the individual grant handlers.
    pub async fn token(
        &self,
        request: &TokenRequest,
        authorization: Option<&str>,
    ) -> AuthResult<TokenResponse> {
        let client = authenticate_client(
            ClientCredentials {
                authorization,
                client_id: request.client_id.as_deref(),
                client_secret: request.client_secret.as_deref(),
            },
            self.client_registry.as_ref(),
        )
        .await?;

        let result = match GrantType::parse(&request.grant_type) {
            Some(GrantType::AuthorizationCode) => self.exchange_code(request, &client).await,
            Some(GrantType::RefreshToken) => self.refresh(request, &client).await,
            Some(GrantType::ClientCredentials) => self.client_credentials(request, &client).await,
            Some(GrantType::Password) => self.password(request, &client).await,
            Some(GrantType::Implicit) | None => {
                Err(AuthError::unsupported_grant_type(&request.grant_type))
            }
        };

        if let Err(e) = &result {
            tracing::warn!(
                client_id = %client.client_id,
                grant_type = %request.grant_type,
                error = %e,
                "Token request rejected"
            );
        }

        result
    }

    /// Exchanges an authorization code for an access and refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The client is not registered for the authorization code grant
    /// - `code` is missing
    /// - The code is unknown, expired, already used, or was issued to another
    ///   client or redirect URI
    pub async fn exchange_code(
        &self,
        request: &TokenRequest,
        client: &Application,
    ) -> AuthResult<TokenResponse> {
        // 1. Validate client grant type
        require_grant_type(client, GrantType::AuthorizationCode)?;

        // 2. Extract the code
        let code = request
            .code
            .as_deref()
            .filter(|code| !code.is_empty())
            .ok_or_else(|| AuthError::invalid_request("Missing code parameter"))?;

        // 3. Consume atomically (one-time use)
        let grant = self
            .grant_storage
            .consume(code, &client.client_id, request.redirect_uri.as_deref())
            .await?;

        // 4. Issue tokens bound to the grant
        let issued = self
            .issuer
            .issue_tokens(&client.client_id, Some(&grant.user_id), grant.scope, true)
            .await?;

        Ok(issued.into())
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// With rotation enabled the presented refresh token and the access token
    /// issued with it are revoked and a new refresh token is returned. They
    /// are revoked only after the new pair is stored, so a failed issuance
    /// leaves the presented token usable.
    /// Otherwise the presented refresh token stays valid and is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `refresh_token` is missing
    /// - The token is unknown, expired, revoked or belongs to another client
    /// - The requested scope is not a subset of the original grant
    pub async fn refresh(
        &self,
        request: &TokenRequest,
        client: &Application,
    ) -> AuthResult<TokenResponse> {
        // 1. Extract and look up the refresh token
        let presented = request
            .refresh_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AuthError::invalid_request("Missing refresh_token parameter"))?;
        let token_hash = hash_token(presented);

        let stored = self
            .token_storage
            .find_refresh_token(&token_hash)
            .await?
            .ok_or_else(|| AuthError::invalid_grant("Unknown refresh token"))?;

        // 2. Validate ownership and status
        if stored.client_id != client.client_id {
            return Err(AuthError::invalid_grant(
                "Refresh token was not issued to this client",
            ));
        }
        if stored.is_revoked() {
            return Err(AuthError::invalid_grant("Refresh token has been revoked"));
        }
        if stored.is_expired() {
            return Err(AuthError::invalid_grant("Refresh token has expired"));
        }

        // 3. Scope may narrow but not expand
        let requested = ScopeSet::parse(request.scope.as_deref().unwrap_or_default());
        let scope = if requested.is_empty() {
            stored.scope.clone()
        } else if requested.is_subset(&stored.scope) {
            requested
        } else {
            return Err(AuthError::invalid_scope(format!(
                "Scope(s) not in original grant: {}",
                requested.difference(&stored.scope).join(" ")
            )));
        };

        // 4. Rotate or reuse. The new pair is stored before the old one is
        // retired; the refresh revocation is the claim that picks one winner.
        if self.rotate_refresh_tokens {
            let issued = self
                .issuer
                .issue_tokens(&client.client_id, Some(&stored.user_id), scope, true)
                .await?;

            if !self.token_storage.revoke_refresh_token(&token_hash).await? {
                tracing::warn!(
                    client_id = %client.client_id,
                    "Refresh token redeemed concurrently, discarding new tokens"
                );
                self.discard(&issued).await;
                return Err(AuthError::invalid_grant("Refresh token has been revoked"));
            }
            self.token_storage
                .revoke_access_token(&stored.access_token_hash)
                .await?;

            return Ok(issued.into());
        }

        let issued = self
            .issuer
            .issue_tokens(&client.client_id, Some(&stored.user_id), scope, false)
            .await?;
        let mut response = TokenResponse::from(issued);
        response.refresh_token = Some(presented.to_string());
        Ok(response)
    }

    async fn discard(&self, issued: &IssuedTokens) {
        let access = self
            .token_storage
            .revoke_access_token(&hash_token(&issued.access_token))
            .await;
        let refresh = match &issued.refresh_token {
            Some(value) => self.token_storage.revoke_refresh_token(&hash_token(value)).await,
            None => Ok(false),
        };
        if let Err(e) = access.and(refresh) {
            tracing::error!(error = %e, "Failed to discard unused tokens");
        }
    }

    /// Issues an access token to a confidential client acting for itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is public or not registered for the
    /// client credentials grant, or the requested scope is unknown.
    pub async fn client_credentials(
        &self,
        request: &TokenRequest,
        client: &Application,
    ) -> AuthResult<TokenResponse> {
        require_grant_type(client, GrantType::ClientCredentials)?;
        if !client.is_confidential() {
            return Err(AuthError::unauthorized_client(
                "Public clients cannot use client_credentials",
            ));
        }

        let scope = self.validator.resolve_scopes(request.scope.as_deref())?;
        let issued = self
            .issuer
            .issue_tokens(&client.client_id, None, scope, false)
            .await?;

        Ok(issued.into())
    }

    /// Issues tokens for verified resource owner credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The client is not registered for the password grant
    /// - No identity provider is configured
    /// - `username` or `password` is missing
    /// - The credentials are wrong
    /// - The requested scope is unknown
    pub async fn password(
        &self,
        request: &TokenRequest,
        client: &Application,
    ) -> AuthResult<TokenResponse> {
        require_grant_type(client, GrantType::Password)?;

        let identity_provider = self
            .identity_provider
            .as_ref()
            .ok_or_else(|| AuthError::unsupported_grant_type(GrantType::Password.as_str()))?;

        let (Some(username), Some(password)) =
            (request.username.as_deref(), request.password.as_deref())
        else {
            return Err(AuthError::invalid_request(
                "Missing username or password parameter",
            ));
        };

        let owner = identity_provider
            .authenticate(username, password)
            .await?
            .ok_or_else(|| AuthError::invalid_grant("Invalid resource owner credentials"))?;

        let scope = self.validator.resolve_scopes(request.scope.as_deref())?;
        let issued = self
            .issuer
            .issue_tokens(&client.client_id, Some(&owner.id), scope, true)
            .await?;

        Ok(issued.into())
    }

    /// Revokes an access or refresh token (RFC 7009).
    ///
    /// Revoking a refresh token also revokes the access token issued with it.
    /// Unknown tokens and tokens of other clients are ignored so the response
    /// reveals nothing about them.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidClient` if client authentication fails, or
    /// a storage error.
    pub async fn revoke(
        &self,
        request: &RevocationRequest,
        authorization: Option<&str>,
    ) -> AuthResult<()> {
        let client = authenticate_client(
            ClientCredentials {
                authorization,
                client_id: request.client_id.as_deref(),
                client_secret: request.client_secret.as_deref(),
            },
            self.client_registry.as_ref(),
        )
        .await?;

        let token_hash = hash_token(&request.token);
        let revoked = match request.token_type_hint {
            Some(TokenTypeHint::RefreshToken) => {
                self.revoke_refresh(&token_hash, &client.client_id).await?
                    || self.revoke_access(&token_hash, &client.client_id).await?
            }
            _ => {
                self.revoke_access(&token_hash, &client.client_id).await?
                    || self.revoke_refresh(&token_hash, &client.client_id).await?
            }
        };

        tracing::info!(client_id = %client.client_id, revoked, "Processed revocation request");
        Ok(())
    }

    async fn revoke_access(&self, token_hash: &str, client_id: &str) -> AuthResult<bool> {
        match self.token_storage.find_access_token(token_hash).await? {
            Some(token) if token.client_id == client_id => {
                self.token_storage.revoke_access_token(token_hash).await
            }
            _ => Ok(false),
        }
    }

    async fn revoke_refresh(&self, token_hash: &str, client_id: &str) -> AuthResult<bool> {
        match self.token_storage.find_refresh_token(token_hash).await? {
            Some(token) if token.client_id == client_id => {
                let revoked = self.token_storage.revoke_refresh_token(token_hash).await?;
                self.token_storage
                    .revoke_access_token(&token.access_token_hash)
                    .await?;
                Ok(revoked)
            }
            _ => Ok(false),
        }
    }
}

fn require_grant_type(client: &Application, grant_type: GrantType) -> AuthResult<()> {
    if client.authorization_grant_type == grant_type {
        Ok(())
    } else {
        Err(AuthError::unauthorized_client(format!(
            "Client is not authorized for the {} grant",
            grant_type
        )))
    }
}
