//! Authorization endpoint response encoding.
//!
//! The code flow returns its parameters in the redirect query string, the
//! implicit flow in the fragment (RFC 6749 Sections 4.1.2 and 4.2.2). Errors
//! use the same component as the success response would have.
//!
//! The redirect target is the validated URI string as registered. It is not
//! round-tripped through [`url::Url`], whose serializer would turn
//! `http://example.it` into `http://example.it/`.

use std::fmt;

use url::form_urlencoded;

use crate::error::AuthError;
use crate::types::ScopeSet;

/// Where response parameters go in the redirect URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// `?key=value`, appended to any existing query.
    Query,
    /// `#key=value`.
    Fragment,
}

/// Appends form-encoded parameters to a redirect URI.
#[must_use]
pub fn encode_redirect(redirect_uri: &str, mode: ResponseMode, params: &[(&str, &str)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    let encoded = serializer.finish();

    let separator = match mode {
        ResponseMode::Fragment => '#',
        ResponseMode::Query if redirect_uri.contains('?') => '&',
        ResponseMode::Query => '?',
    };

    format!("{}{}{}", redirect_uri, separator, encoded)
}

// =============================================================================
// Success Responses
// =============================================================================

/// A successful authorization response.
#[derive(Debug, Clone)]
pub enum AuthorizationResponse {
    /// Code flow: the authorization code.
    Code {
        /// Single-use authorization code.
        code: String,
        /// Echoed `state`, if the request carried one.
        state: Option<String>,
    },

    /// Implicit flow: the access token itself.
    Token {
        /// Bearer token value.
        access_token: String,
        /// Seconds until the token expires.
        expires_in: u64,
        /// Granted scopes.
        scope: ScopeSet,
        /// Echoed `state`, if the request carried one.
        state: Option<String>,
    },
}

impl AuthorizationResponse {
    /// Returns the response mode this response is delivered with.
    #[must_use]
    pub fn mode(&self) -> ResponseMode {
        match self {
            Self::Code { .. } => ResponseMode::Query,
            Self::Token { .. } => ResponseMode::Fragment,
        }
    }

    /// Builds the redirect location.
    #[must_use]
    pub fn to_redirect_url(&self, redirect_uri: &str) -> String {
        match self {
            Self::Code { code, state } => {
                let mut params = vec![("code", code.as_str())];
                if let Some(state) = state {
                    params.push(("state", state.as_str()));
                }
                encode_redirect(redirect_uri, self.mode(), &params)
            }
            Self::Token {
                access_token,
                expires_in,
                scope,
                state,
            } => {
                let expires_in = expires_in.to_string();
                let scope = scope.to_string();
                let mut params = vec![
                    ("access_token", access_token.as_str()),
                    ("token_type", "Bearer"),
                    ("expires_in", expires_in.as_str()),
                    ("scope", scope.as_str()),
                ];
                if let Some(state) = state {
                    params.push(("state", state.as_str()));
                }
                encode_redirect(redirect_uri, self.mode(), &params)
            }
        }
    }
}

// =============================================================================
// Error Responses
// =============================================================================

/// Authorization endpoint error codes (RFC 6749 Section 4.1.2.1).
///
/// `InvalidClient` and `InvalidRedirectUri` are only ever delivered directly,
/// never by redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorizationErrorCode {
    /// Missing, repeated or malformed parameter.
    InvalidRequest,
    /// Unknown client.
    InvalidClient,
    /// Malformed or unregistered redirect URI.
    InvalidRedirectUri,
    /// The client may not use this flow.
    UnauthorizedClient,
    /// The resource owner denied the request.
    AccessDenied,
    /// Unknown response type or one the client is not registered for.
    UnsupportedResponseType,
    /// Unknown scope.
    InvalidScope,
    /// Unexpected server failure.
    ServerError,
}

impl AuthorizationErrorCode {
    /// Returns the wire `error` value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest | Self::InvalidRedirectUri => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::AccessDenied => "access_denied",
            Self::UnsupportedResponseType => "unsupported_response_type",
            Self::InvalidScope => "invalid_scope",
            Self::ServerError => "server_error",
        }
    }
}

impl fmt::Display for AuthorizationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&AuthError> for AuthorizationErrorCode {
    fn from(error: &AuthError) -> Self {
        match error {
            AuthError::InvalidClient { .. } => Self::InvalidClient,
            AuthError::InvalidRedirectUri { .. } => Self::InvalidRedirectUri,
            AuthError::UnauthorizedClient { .. } => Self::UnauthorizedClient,
            AuthError::AccessDenied { .. } => Self::AccessDenied,
            AuthError::UnsupportedResponseType { .. } => Self::UnsupportedResponseType,
            AuthError::InvalidScope { .. } => Self::InvalidScope,
            e if e.is_server_error() => Self::ServerError,
            _ => Self::InvalidRequest,
        }
    }
}

/// An error delivered to the client by redirect.
#[derive(Debug, Clone)]
pub struct AuthorizationError {
    /// Error code.
    pub error: AuthorizationErrorCode,
    /// Human-readable description.
    pub error_description: Option<String>,
    /// Echoed `state`, if the request carried one.
    pub state: Option<String>,
}

impl AuthorizationError {
    /// Creates an error response from an [`AuthError`].
    #[must_use]
    pub fn from_auth_error(error: &AuthError, state: Option<String>) -> Self {
        Self {
            error: AuthorizationErrorCode::from(error),
            error_description: Some(error.to_string()),
            state,
        }
    }

    /// Builds the redirect location.
    #[must_use]
    pub fn to_redirect_url(&self, redirect_uri: &str, mode: ResponseMode) -> String {
        let mut params = vec![("error", self.error.as_str())];
        if let Some(description) = &self.error_description {
            params.push(("error_description", description.as_str()));
        }
        if let Some(state) = &self.state {
            params.push(("state", state.as_str()));
        }
        encode_redirect(redirect_uri, mode, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_keeps_uri_verbatim() {
        let url = encode_redirect("http://example.it", ResponseMode::Fragment, &[("a", "b")]);
        assert_eq!(url, "http://example.it#a=b");
    }

    #[test]
    fn test_query_appends_to_existing_query() {
        let url = encode_redirect("http://localhost/cb?x=1", ResponseMode::Query, &[("code", "c")]);
        assert_eq!(url, "http://localhost/cb?x=1&code=c");

        let url = encode_redirect("http://localhost/cb", ResponseMode::Query, &[("code", "c")]);
        assert_eq!(url, "http://localhost/cb?code=c");
    }

    #[test]
    fn test_token_response_in_fragment() {
        let response = AuthorizationResponse::Token {
            access_token: "tok".to_string(),
            expires_in: 3600,
            scope: ScopeSet::parse("read write"),
            state: Some("S".to_string()),
        };
        assert_eq!(
            response.to_redirect_url("http://example.it"),
            "http://example.it#access_token=tok&token_type=Bearer&expires_in=3600&scope=read+write&state=S"
        );
    }

    #[test]
    fn test_code_response_in_query_without_state() {
        let response = AuthorizationResponse::Code {
            code: "abc".to_string(),
            state: None,
        };
        let url = response.to_redirect_url("http://localhost");
        assert_eq!(url, "http://localhost?code=abc");
        assert!(!url.contains("state"));
    }

    #[test]
    fn test_error_redirect() {
        let error = AuthorizationError {
            error: AuthorizationErrorCode::AccessDenied,
            error_description: None,
            state: Some("random state".to_string()),
        };
        assert_eq!(
            error.to_redirect_url("http://example.it", ResponseMode::Fragment),
            "http://example.it#error=access_denied&state=random+state"
        );
        assert_eq!(
            error.to_redirect_url("http://example.it", ResponseMode::Query),
            "http://example.it?error=access_denied&state=random+state"
        );
    }

    #[test]
    fn test_error_code_from_auth_error() {
        assert_eq!(
            AuthorizationErrorCode::from(&AuthError::invalid_scope("x")),
            AuthorizationErrorCode::InvalidScope
        );
        assert_eq!(
            AuthorizationErrorCode::from(&AuthError::storage("x")),
            AuthorizationErrorCode::ServerError
        );
        assert_eq!(AuthorizationErrorCode::InvalidRedirectUri.as_str(), "invalid_request");
    }
}
