//! # warden-auth
//!
//! OAuth 2.0 authorization server engine.
//!
//! This crate provides:
//! - Authorization endpoint validation with consent for the `code` and
//!   `token` (implicit) response types
//! - Token endpoint grants: authorization code, refresh token, client
//!   credentials and resource owner password
//! - Token revocation and bearer token validation
//!
//! It owns no transport and no persistent state. Callers hand it parsed
//! request parameters plus an authenticated resource owner, and map the
//! returned outcomes to HTTP. Storage is reached through the traits in
//! [`storage`].
//!
//! ## Modules
//!
//! - [`config`] - Scopes and credential lifetimes
//! - [`error`] - Error type and OAuth error codes
//! - [`identity`] - Resource owner and identity provider
//! - [`oauth`] - Authorization endpoint, consent and token issuance
//! - [`secret`] - Client credential generation and hashing
//! - [`storage`] - Storage traits for clients, codes and tokens
//! - [`token`] - Token endpoint, revocation and bearer validation
//! - [`types`] - Domain types

pub mod config;
pub mod error;
pub mod identity;
pub mod oauth;
pub mod secret;
pub mod storage;
pub mod token;
pub mod types;

pub use config::{AuthConfig, ConfigError, OAuthConfig};
pub use error::{AuthError, ErrorCategory};
pub use identity::{IdentityProvider, ResourceOwner};
pub use oauth::{
    AuthorizationOutcome, AuthorizationRequest, AuthorizationService, ConsentDecision,
    ResponseType, TokenIssuer, TokenRequest, TokenResponse, ValidatedRequest,
};
pub use storage::{ClientRegistry, GrantStorage, TokenStorage};
pub use token::{AccessContext, ResourceGuard, RevocationRequest, TokenService};
pub use types::{
    AccessToken, Application, AuthorizationGrant, ClientType, GrantType, RefreshToken, ScopeSet,
};

/// Type alias for authorization server results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use warden_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::{AuthConfig, ConfigError, OAuthConfig};
    pub use crate::error::{AuthError, ErrorCategory};
    pub use crate::identity::{IdentityProvider, ResourceOwner};
    pub use crate::oauth::{
        AuthorizationError, AuthorizationErrorCode, AuthorizationOutcome, AuthorizationRequest,
        AuthorizationService, ConsentDecision, ResponseMode, ResponseType, TokenErrorResponse,
        TokenIssuer, TokenRequest, TokenResponse, ValidatedRequest,
    };
    pub use crate::storage::{ClientRegistry, GrantStorage, TokenStorage};
    pub use crate::token::{
        AccessContext, ResourceGuard, RevocationRequest, TokenService, TokenTypeHint,
    };
    pub use crate::types::{
        AccessToken, Application, AuthorizationGrant, ClientType, GrantType, RefreshToken,
        ScopeSet,
    };
}
