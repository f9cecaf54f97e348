//! Token endpoint request and response types (RFC 6749 Sections 4 and 5).

use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::oauth::issuer::IssuedTokens;

/// Token endpoint request body.
///
/// Which fields are required depends on `grant_type`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRequest {
    /// `authorization_code`, `refresh_token`, `client_credentials` or `password`.
    pub grant_type: String,

    /// Authorization code (`authorization_code`).
    pub code: Option<String>,

    /// Redirect URI the code was delivered to (`authorization_code`).
    pub redirect_uri: Option<String>,

    /// Client identifier, when not sent via HTTP Basic.
    pub client_id: Option<String>,

    /// Client secret, when not sent via HTTP Basic.
    pub client_secret: Option<String>,

    /// Refresh token (`refresh_token`).
    pub refresh_token: Option<String>,

    /// Requested scopes (`refresh_token`, `client_credentials`, `password`).
    pub scope: Option<String>,

    /// Resource owner username (`password`).
    pub username: Option<String>,

    /// Resource owner password (`password`).
    pub password: Option<String>,
}

/// Successful token response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The access token.
    pub access_token: String,

    /// Always `Bearer`.
    pub token_type: String,

    /// Seconds until the access token expires.
    pub expires_in: u64,

    /// Granted scopes, space-delimited.
    pub scope: String,

    /// Refresh token, if one was issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl From<IssuedTokens> for TokenResponse {
    fn from(issued: IssuedTokens) -> Self {
        Self {
            access_token: issued.access_token,
            token_type: "Bearer".to_string(),
            expires_in: issued.expires_in,
            scope: issued.scope.to_string(),
            refresh_token: issued.refresh_token,
        }
    }
}

/// Token endpoint error body (RFC 6749 Section 5.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenErrorResponse {
    /// Error code.
    pub error: String,

    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl From<&AuthError> for TokenErrorResponse {
    fn from(error: &AuthError) -> Self {
        // Server-side details stay in the logs.
        let error_description = if error.is_server_error() {
            None
        } else {
            Some(error.to_string())
        };
        Self {
            error: error.oauth_error_code().to_string(),
            error_description,
        }
    }
}
