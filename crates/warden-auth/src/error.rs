//! Authorization server error types.
//!
//! Every failure the engine can report maps to exactly one [`AuthError`]
//! variant, one OAuth 2.0 error code and one HTTP-style status.

use std::fmt;

/// Errors that can occur while validating requests or issuing credentials.
///
/// Message-carrying variants hold a human-readable detail intended for logs
/// and `error_description`; it never contains secrets or token values.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The client is unknown or failed authentication.
    #[error("Invalid client: {message}")]
    InvalidClient { message: String },

    /// The redirect URI is malformed or not registered for the client.
    #[error("Invalid redirect URI: {message}")]
    InvalidRedirectUri { message: String },

    /// The authorization code or refresh token is invalid, expired, or reused.
    #[error("Invalid grant: {message}")]
    InvalidGrant { message: String },

    /// The requested scope is unknown or exceeds what may be granted.
    #[error("Invalid scope: {message}")]
    InvalidScope { message: String },

    /// The bearer token is unknown, malformed, revoked, or expired.
    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    /// The bearer token is valid but lacks `required`.
    #[error("Insufficient scope: {required}")]
    InsufficientScope { required: String },

    /// A parameter is missing, repeated, or malformed.
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// The client may not use the requested grant type.
    #[error("Unauthorized client: {message}")]
    UnauthorizedClient { message: String },

    /// The resource owner denied the authorization request.
    #[error("Access denied: {message}")]
    AccessDenied { message: String },

    #[error("Unsupported response type: {response_type}")]
    UnsupportedResponseType { response_type: String },

    #[error("Unsupported grant type: {grant_type}")]
    UnsupportedGrantType { grant_type: String },

    /// A generated identifier or token collided with a stored one.
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// The storage backend failed.
    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

macro_rules! constructors {
    ($($(#[$meta:meta])* $name:ident => $variant:ident { $field:ident }),* $(,)?) => {
        $(
            $(#[$meta])*
            #[must_use]
            pub fn $name($field: impl Into<String>) -> Self {
                Self::$variant { $field: $field.into() }
            }
        )*
    };
}

impl AuthError {
    constructors! {
        /// Builds [`AuthError::InvalidClient`].
        invalid_client => InvalidClient { message },
        /// Builds [`AuthError::InvalidRedirectUri`].
        invalid_redirect_uri => InvalidRedirectUri { message },
        /// Builds [`AuthError::InvalidGrant`].
        invalid_grant => InvalidGrant { message },
        /// Builds [`AuthError::InvalidScope`].
        invalid_scope => InvalidScope { message },
        /// Builds [`AuthError::InvalidToken`].
        invalid_token => InvalidToken { message },
        /// Builds [`AuthError::InsufficientScope`] naming the missing scopes.
        insufficient_scope => InsufficientScope { required },
        /// Builds [`AuthError::InvalidRequest`].
        invalid_request => InvalidRequest { message },
        /// Builds [`AuthError::UnauthorizedClient`].
        unauthorized_client => UnauthorizedClient { message },
        /// Builds [`AuthError::AccessDenied`].
        access_denied => AccessDenied { message },
        /// Builds [`AuthError::UnsupportedResponseType`] echoing the offending value.
        unsupported_response_type => UnsupportedResponseType { response_type },
        /// Builds [`AuthError::UnsupportedGrantType`] echoing the offending value.
        unsupported_grant_type => UnsupportedGrantType { grant_type },
        /// Builds [`AuthError::Conflict`].
        conflict => Conflict { message },
        /// Builds [`AuthError::Storage`].
        storage => Storage { message },
        /// Builds [`AuthError::Configuration`].
        configuration => Configuration { message },
        /// Builds [`AuthError::Internal`].
        internal => Internal { message },
    }

    /// `true` when the caller is at fault. Every error is either a client or
    /// a server error.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !self.is_server_error()
    }

    /// `true` for failures of the server itself (storage, configuration,
    /// collisions, bugs).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Infrastructure | ErrorCategory::Configuration | ErrorCategory::Internal
        )
    }

    /// `true` for errors raised while checking a bearer token at a
    /// protected resource.
    #[must_use]
    pub fn is_token_error(&self) -> bool {
        self.category() == ErrorCategory::Token
    }

    /// Coarse classification used as a structured logging field.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        use ErrorCategory as C;

        match self {
            Self::InvalidClient { .. } | Self::InvalidGrant { .. } => C::Authentication,
            Self::UnauthorizedClient { .. }
            | Self::InvalidScope { .. }
            | Self::AccessDenied { .. } => C::Authorization,
            Self::InvalidToken { .. } | Self::InsufficientScope { .. } => C::Token,
            Self::InvalidRedirectUri { .. }
            | Self::InvalidRequest { .. }
            | Self::UnsupportedResponseType { .. }
            | Self::UnsupportedGrantType { .. } => C::Validation,
            Self::Conflict { .. } | Self::Storage { .. } => C::Infrastructure,
            Self::Configuration { .. } => C::Configuration,
            Self::Internal { .. } => C::Internal,
        }
    }

    /// The `error` value sent to clients (RFC 6749 section 4.1.2.1 / 5.2,
    /// RFC 6750 section 3.1).
    ///
    /// A bad redirect URI has no dedicated code and is reported as
    /// `invalid_request`. Server-side failures collapse to `server_error`.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        if self.is_server_error() {
            return "server_error";
        }

        match self {
            Self::InvalidClient { .. } => "invalid_client",
            Self::InvalidGrant { .. } => "invalid_grant",
            Self::InvalidScope { .. } => "invalid_scope",
            Self::InvalidToken { .. } => "invalid_token",
            Self::InsufficientScope { .. } => "insufficient_scope",
            Self::InvalidRequest { .. } | Self::InvalidRedirectUri { .. } => "invalid_request",
            Self::UnauthorizedClient { .. } => "unauthorized_client",
            Self::AccessDenied { .. } => "access_denied",
            Self::UnsupportedResponseType { .. } => "unsupported_response_type",
            Self::UnsupportedGrantType { .. } => "unsupported_grant_type",
            Self::Conflict { .. }
            | Self::Storage { .. }
            | Self::Configuration { .. }
            | Self::Internal { .. } => "server_error",
        }
    }

    /// HTTP status for errors rendered directly rather than via redirect
    /// (token endpoint, revocation, resource access).
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidClient { .. } | Self::InvalidToken { .. } => 401,
            Self::InsufficientScope { .. } => 403,
            _ if self.is_server_error() => 500,
            _ => 400,
        }
    }
}

/// Error classes reported in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Authentication,
    Authorization,
    Token,
    Validation,
    Infrastructure,
    Configuration,
    Internal,
}

impl ErrorCategory {
    /// Lowercase name used as a log field value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::Authorization => "authorization",
            Self::Token => "token",
            Self::Validation => "validation",
            Self::Infrastructure => "infrastructure",
            Self::Configuration => "configuration",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
