//! Registered OAuth 2.0 client applications.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// =============================================================================
// Client Type
// =============================================================================

/// Client type as defined in RFC 6749 Section 2.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientType {
    /// Can keep a secret (server-side applications).
    Confidential,
    /// Cannot keep a secret (browser and native applications).
    Public,
}

impl ClientType {
    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confidential => "confidential",
            Self::Public => "public",
        }
    }
}

impl std::fmt::Display for ClientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Grant Type
// =============================================================================

/// OAuth 2.0 authorization grant types.
///
/// Each application is registered for exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Authorization Code flow.
    AuthorizationCode,
    /// Implicit flow (token returned in the redirect fragment).
    Implicit,
    /// Resource Owner Password Credentials flow.
    Password,
    /// Client Credentials flow (confidential clients only).
    ClientCredentials,
    /// Refresh Token flow.
    RefreshToken,
}

impl GrantType {
    /// Returns the OAuth 2.0 `grant_type` parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::Implicit => "implicit",
            Self::Password => "password",
            Self::ClientCredentials => "client_credentials",
            Self::RefreshToken => "refresh_token",
        }
    }

    /// Parses a `grant_type` parameter value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "authorization_code" => Some(Self::AuthorizationCode),
            "implicit" => Some(Self::Implicit),
            "password" => Some(Self::Password),
            "client_credentials" => Some(Self::ClientCredentials),
            "refresh_token" => Some(Self::RefreshToken),
            _ => None,
        }
    }

    /// Returns `true` if the grant goes through the authorization endpoint
    /// and therefore needs a registered redirect URI.
    #[must_use]
    pub fn uses_redirect(&self) -> bool {
        matches!(self, Self::AuthorizationCode | Self::Implicit)
    }
}

impl std::fmt::Display for GrantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Application
// =============================================================================

/// A registered OAuth 2.0 client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    /// Unique client identifier used in OAuth flows.
    pub client_id: String,

    /// Argon2 PHC hash of the client secret.
    /// Public clients usually have none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Human-readable display name.
    pub name: String,

    /// Confidential or public.
    pub client_type: ClientType,

    /// The single grant type this client is registered for.
    pub authorization_grant_type: GrantType,

    /// Allowed redirect URIs, space-delimited. The first one is the default.
    #[serde(default)]
    pub redirect_uris: String,

    /// Identifier of the user who owns the registration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// When the application was registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Application {
    /// Creates an application with no secret, no redirect URIs and no owner.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        name: impl Into<String>,
        client_type: ClientType,
        authorization_grant_type: GrantType,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            name: name.into(),
            client_type,
            authorization_grant_type,
            redirect_uris: String::new(),
            user_id: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Sets the space-delimited redirect URI list.
    #[must_use]
    pub fn with_redirect_uris(mut self, redirect_uris: impl Into<String>) -> Self {
        self.redirect_uris = redirect_uris.into();
        self
    }

    /// Sets the hashed client secret.
    #[must_use]
    pub fn with_secret_hash(mut self, hash: impl Into<String>) -> Self {
        self.client_secret = Some(hash.into());
        self
    }

    /// Sets the owning user.
    #[must_use]
    pub fn with_owner(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Iterates the registered redirect URIs in registration order.
    pub fn redirect_uri_list(&self) -> impl Iterator<Item = &str> {
        self.redirect_uris.split_whitespace()
    }

    /// Returns the first registered redirect URI.
    #[must_use]
    pub fn default_redirect_uri(&self) -> Option<&str> {
        self.redirect_uri_list().next()
    }

    /// Checks if `uri` is registered. The match is exact string equality.
    #[must_use]
    pub fn is_redirect_uri_allowed(&self, uri: &str) -> bool {
        self.redirect_uri_list().any(|allowed| allowed == uri)
    }

    /// Returns `true` for confidential clients.
    #[must_use]
    pub fn is_confidential(&self) -> bool {
        self.client_type == ClientType::Confidential
    }

    /// Validates the registration.
    ///
    /// # Errors
    ///
    /// Returns the first rule the application violates.
    pub fn validate(&self) -> Result<(), ApplicationValidationError> {
        if self.client_id.is_empty() {
            return Err(ApplicationValidationError::EmptyClientId);
        }

        if self.authorization_grant_type.uses_redirect() && self.default_redirect_uri().is_none()
        {
            return Err(ApplicationValidationError::NoRedirectUris);
        }

        for uri in self.redirect_uri_list() {
            match url::Url::parse(uri) {
                Ok(parsed) if parsed.fragment().is_none() => {}
                _ => return Err(ApplicationValidationError::InvalidRedirectUri(uri.to_string())),
            }
        }

        if self.is_confidential() && self.client_secret.is_none() {
            return Err(ApplicationValidationError::MissingSecret);
        }

        if !self.is_confidential() && self.authorization_grant_type == GrantType::ClientCredentials
        {
            return Err(ApplicationValidationError::PublicClientCredentials);
        }

        Ok(())
    }
}

/// Reasons an [`Application`] registration is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplicationValidationError {
    /// Client ID cannot be empty.
    #[error("Client ID cannot be empty")]
    EmptyClientId,

    /// Authorization code and implicit clients need a redirect URI.
    #[error("Redirect URIs are required for authorization_code and implicit grants")]
    NoRedirectUris,

    /// A registered redirect URI is not absolute or carries a fragment.
    #[error("Invalid redirect URI: {0}")]
    InvalidRedirectUri(String),

    /// Confidential clients must have a client secret.
    #[error("Confidential clients must have a client secret")]
    MissingSecret,

    /// Public clients cannot use client_credentials grant.
    #[error("Public clients cannot use client_credentials grant")]
    PublicClientCredentials,
}
