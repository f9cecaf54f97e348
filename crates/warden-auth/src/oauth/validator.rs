//! Redirect URI and scope validation.
//!
//! Both checks are pure: they look only at the registered application and
//! the server-wide scope configuration the validator was built with.

use crate::AuthResult;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::types::{Application, ScopeSet};

/// A redirect URI that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRedirect {
    /// The URI responses are sent to, exactly as registered.
    pub uri: String,

    /// `false` if the request omitted `redirect_uri` and the default was used.
    pub provided: bool,
}

/// Validates redirect URIs and resolves requested scopes.
#[derive(Debug, Clone)]
pub struct RequestValidator {
    allowed_scopes: ScopeSet,
    default_scopes: ScopeSet,
}

impl RequestValidator {
    /// Creates a validator for the configured scope sets.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            allowed_scopes: config.scopes.iter().cloned().collect(),
            default_scopes: config.effective_default_scopes().iter().cloned().collect(),
        }
    }

    /// Validates a requested redirect URI against the application.
    ///
    /// An absent or empty candidate resolves to the first registered URI.
    /// Otherwise the candidate must be an absolute URI without a fragment
    /// and must equal one registered URI character for character.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidRedirectUri` if the candidate is malformed
    /// or unregistered, or if the application has no registered URIs.
    pub fn validate_redirect_uri(
        &self,
        application: &Application,
        candidate: Option<&str>,
    ) -> AuthResult<ResolvedRedirect> {
        let candidate = candidate.filter(|uri| !uri.is_empty());

        let Some(uri) = candidate else {
            return application
                .default_redirect_uri()
                .map(|uri| ResolvedRedirect {
                    uri: uri.to_string(),
                    provided: false,
                })
                .ok_or_else(|| {
                    AuthError::invalid_redirect_uri("Client has no registered redirect URI")
                });
        };

        match url::Url::parse(uri) {
            Ok(parsed) if parsed.fragment().is_none() => {}
            Ok(_) => {
                return Err(AuthError::invalid_redirect_uri(
                    "Redirect URI must not contain a fragment",
                ));
            }
            Err(e) => {
                return Err(AuthError::invalid_redirect_uri(format!(
                    "Malformed redirect URI: {}",
                    e
                )));
            }
        }

        if !application.is_redirect_uri_allowed(uri) {
            return Err(AuthError::invalid_redirect_uri("Mismatching redirect URI"));
        }

        Ok(ResolvedRedirect {
            uri: uri.to_string(),
            provided: true,
        })
    }

    /// Resolves the requested scopes.
    ///
    /// An absent or blank request yields the default scope set. Otherwise
    /// every requested token must be an allowed scope; unknown scopes are
    /// rejected, never dropped.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidScope` naming the unknown scopes.
    pub fn resolve_scopes(&self, requested: Option<&str>) -> AuthResult<ScopeSet> {
        let requested = ScopeSet::parse(requested.unwrap_or_default());
        if requested.is_empty() {
            return Ok(self.default_scopes.clone());
        }

        let unknown = requested.difference(&self.allowed_scopes);
        if !unknown.is_empty() {
            return Err(AuthError::invalid_scope(format!(
                "Unknown scope(s): {}",
                unknown.join(" ")
            )));
        }

        Ok(requested)
    }
}
