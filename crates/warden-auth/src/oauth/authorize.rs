//! Authorization endpoint request and outcome types.
//!
//! A request moves through `Received -> Validated -> {ConsentPending, Rejected}`
//! and, once the owner allows it, `Granted`. The raw [`AuthorizationRequest`]
//! is the received state. [`ValidatedRequest`] only exists for requests that
//! passed validation and is what consent is rendered from. Every other state
//! is reported through [`AuthorizationOutcome`].

use std::fmt;

use serde::Deserialize;

use crate::identity::ResourceOwner;
use crate::oauth::response::{AuthorizationErrorCode, ResponseMode};
use crate::types::{Application, GrantType, ScopeSet};

/// Raw authorization request parameters, as received.
///
/// Every field is optional so that missing parameters are reported by the
/// validator rather than by deserialization. The consent form posts the
/// scopes back as `scopes`, which is accepted as an alias.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizationRequest {
    /// Client identifier.
    pub client_id: Option<String>,

    /// `code` or `token`.
    pub response_type: Option<String>,

    /// Where to send the response. Defaults to the first registered URI.
    pub redirect_uri: Option<String>,

    /// Space-delimited scopes.
    #[serde(alias = "scopes")]
    pub scope: Option<String>,

    /// Opaque client state, echoed back verbatim.
    pub state: Option<String>,
}

/// Supported `response_type` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseType {
    /// Authorization code flow.
    Code,
    /// Implicit flow.
    Token,
}

impl ResponseType {
    /// Parses a `response_type` parameter value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "code" => Some(Self::Code),
            "token" => Some(Self::Token),
            _ => None,
        }
    }

    /// Returns the parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Token => "token",
        }
    }

    /// Returns the grant type a client must be registered for.
    #[must_use]
    pub fn required_grant_type(&self) -> GrantType {
        match self {
            Self::Code => GrantType::AuthorizationCode,
            Self::Token => GrantType::Implicit,
        }
    }

    /// Returns how responses to this flow are encoded.
    #[must_use]
    pub fn response_mode(&self) -> ResponseMode {
        match self {
            Self::Code => ResponseMode::Query,
            Self::Token => ResponseMode::Fragment,
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A request that passed validation and awaits the owner's decision.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    /// The requesting application.
    pub application: Application,

    /// The requested flow.
    pub response_type: ResponseType,

    /// The validated redirect URI.
    pub redirect_uri: String,

    /// `false` if the redirect URI was defaulted.
    pub redirect_uri_provided: bool,

    /// Resolved scopes.
    pub scope: ScopeSet,

    /// Client state, `None` if the request had none.
    pub state: Option<String>,

    /// The authenticated resource owner.
    pub owner: ResourceOwner,
}

impl ValidatedRequest {
    /// Returns the client identifier.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.application.client_id
    }

    /// Returns how responses to this request are encoded.
    #[must_use]
    pub fn response_mode(&self) -> ResponseMode {
        self.response_type.response_mode()
    }
}

/// The resource owner's answer to a consent prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsentDecision {
    /// Whether the owner approved the request.
    pub allow: bool,

    /// Scopes the owner confirmed. `None` or an empty set grants every
    /// validated scope.
    pub scopes: Option<ScopeSet>,
}

impl ConsentDecision {
    /// Approves every requested scope.
    #[must_use]
    pub fn allow() -> Self {
        Self {
            allow: true,
            scopes: None,
        }
    }

    /// Approves a subset of the requested scopes.
    #[must_use]
    pub fn allow_scopes(scopes: ScopeSet) -> Self {
        Self {
            allow: true,
            scopes: Some(scopes),
        }
    }

    /// Denies the request.
    #[must_use]
    pub fn deny() -> Self {
        Self {
            allow: false,
            scopes: None,
        }
    }
}

/// What the transport should do with an authorization request.
#[derive(Debug, Clone)]
pub enum AuthorizationOutcome {
    /// Show the consent prompt for this request.
    RenderConsent(ValidatedRequest),

    /// Redirect the user agent with a code or token.
    RedirectSuccess {
        /// Full redirect location.
        location: String,
    },

    /// Redirect the user agent with an error.
    RedirectError {
        /// Full redirect location.
        location: String,
        /// The error carried in the location.
        error: AuthorizationErrorCode,
    },

    /// Answer the user agent directly. The redirect URI could not be trusted.
    DirectError {
        /// HTTP status.
        status: u16,
        /// Error code.
        error: AuthorizationErrorCode,
        /// Human-readable description.
        description: String,
    },
}

impl AuthorizationOutcome {
    /// HTTP status the transport should answer with.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::RenderConsent(_) => 200,
            Self::RedirectSuccess { .. } | Self::RedirectError { .. } => 302,
            Self::DirectError { status, .. } => *status,
        }
    }

    /// The redirect location, for redirect outcomes.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::RedirectSuccess { location } | Self::RedirectError { location, .. } => {
                Some(location)
            }
            _ => None,
        }
    }

    /// The error code, for error outcomes.
    #[must_use]
    pub fn error(&self) -> Option<AuthorizationErrorCode> {
        match self {
            Self::RedirectError { error, .. } | Self::DirectError { error, .. } => Some(*error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_type_parse() {
        assert_eq!(ResponseType::parse("code"), Some(ResponseType::Code));
        assert_eq!(ResponseType::parse("token"), Some(ResponseType::Token));
        assert_eq!(ResponseType::parse("id_token"), None);
        assert_eq!(ResponseType::parse(""), None);
    }

    #[test]
    fn test_response_type_mode() {
        assert_eq!(ResponseType::Code.response_mode(), ResponseMode::Query);
        assert_eq!(ResponseType::Token.response_mode(), ResponseMode::Fragment);
        assert_eq!(
            ResponseType::Token.required_grant_type(),
            GrantType::Implicit
        );
    }

    #[test]
    fn test_request_accepts_scopes_alias() {
        let request: AuthorizationRequest = serde_json::from_value(serde_json::json!({
            "client_id": "abc",
            "response_type": "token",
            "scopes": "read write",
        }))
        .unwrap();
        assert_eq!(request.scope.as_deref(), Some("read write"));
        assert!(request.state.is_none());
    }

    #[test]
    fn test_outcome_accessors() {
        let outcome = AuthorizationOutcome::RedirectError {
            location: "http://localhost?error=access_denied".to_string(),
            error: AuthorizationErrorCode::AccessDenied,
        };
        assert_eq!(outcome.status(), 302);
        assert_eq!(outcome.location(), Some("http://localhost?error=access_denied"));
        assert_eq!(outcome.error(), Some(AuthorizationErrorCode::AccessDenied));

        let outcome = AuthorizationOutcome::DirectError {
            status: 400,
            error: AuthorizationErrorCode::InvalidClient,
            description: "Unknown client".to_string(),
        };
        assert_eq!(outcome.status(), 400);
        assert!(outcome.location().is_none());
    }
}
