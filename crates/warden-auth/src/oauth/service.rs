//! Authorization endpoint service.
//!
//! [`AuthorizationService::authorize`] validates an incoming request and
//! either asks for consent or rejects it. [`AuthorizationService::decide`]
//! applies the owner's decision to a validated request.
//!
//! # Error delivery
//!
//! Until the redirect URI has been validated, failures are answered directly
//! (`DirectError`) so an attacker-supplied URI is never used as a redirect
//! target. After that, every failure (owner denial included) is a redirect
//! carrying `error` and the echoed `state`.
//!
//! # Usage
//!
//! ```ignore
//! let service = AuthorizationService::new(clients, issuer, &config);
//!
//! match service.authorize(&request, &owner).await? {
//!     AuthorizationOutcome::RenderConsent(validated) => { /* show consent page */ }
//!     outcome => { /* redirect or error page */ }
//! }
//! ```

use std::sync::Arc;

use crate::AuthResult;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::identity::ResourceOwner;
use crate::oauth::authorize::{
    AuthorizationOutcome, AuthorizationRequest, ConsentDecision, ResponseType, ValidatedRequest,
};
use crate::oauth::issuer::TokenIssuer;
use crate::oauth::response::{
    AuthorizationError, AuthorizationErrorCode, AuthorizationResponse, ResponseMode,
};
use crate::oauth::validator::RequestValidator;
use crate::storage::ClientRegistry;

/// Validates authorization requests and applies consent decisions.
pub struct AuthorizationService {
    client_registry: Arc<dyn ClientRegistry>,
    issuer: Arc<TokenIssuer>,
    validator: RequestValidator,
}

impl AuthorizationService {
    /// Creates a new authorization service.
    #[must_use]
    pub fn new(
        client_registry: Arc<dyn ClientRegistry>,
        issuer: Arc<TokenIssuer>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            client_registry,
            issuer,
            validator: RequestValidator::new(config),
        }
    }

    /// Validates an authorization request.
    ///
    /// Checks run in order: client, redirect URI, response type, scopes.
    /// A valid request yields `RenderConsent`; an unknown client or a bad
    /// redirect URI yields a 400 `DirectError`; anything later yields a
    /// `RedirectError` to the validated redirect URI.
    ///
    /// # Errors
    ///
    /// Returns an error only if the client registry fails.
    pub async fn authorize(
        &self,
        request: &AuthorizationRequest,
        owner: &ResourceOwner,
    ) -> AuthResult<AuthorizationOutcome> {
        // 1. Resolve the client
        let client_id = request.client_id.as_deref().unwrap_or_default();
        let application = if client_id.is_empty() {
            None
        } else {
            self.client_registry.find_by_client_id(client_id).await?
        };
        let Some(application) = application else {
            tracing::warn!(client_id = %client_id, "Authorization request for unknown client");
            return Ok(direct_error(&AuthError::invalid_client("Unknown client")));
        };

        // 2. Validate the redirect URI before it is used for anything
        let redirect = match self
            .validator
            .validate_redirect_uri(&application, request.redirect_uri.as_deref())
        {
            Ok(redirect) => redirect,
            Err(e) => {
                tracing::warn!(client_id = %client_id, error = %e, "Rejected redirect URI");
                return Ok(direct_error(&e));
            }
        };

        // 3. Validate response_type against the client's grant type.
        //    Unknown values are reported in the query component.
        let raw_response_type = request.response_type.as_deref().unwrap_or_default();
        let response_type = match ResponseType::parse(raw_response_type) {
            Some(rt) if rt.required_grant_type() == application.authorization_grant_type => rt,
            parsed => {
                let mode = parsed.map_or(ResponseMode::Query, |rt| rt.response_mode());
                let error = AuthError::unsupported_response_type(raw_response_type);
                tracing::warn!(
                    client_id = %client_id,
                    response_type = %raw_response_type,
                    grant_type = %application.authorization_grant_type,
                    "Response type not allowed for client"
                );
                return Ok(redirect_error(&error, &redirect.uri, mode, request.state.clone()));
            }
        };

        // 4. Resolve scopes
        let scope = match self.validator.resolve_scopes(request.scope.as_deref()) {
            Ok(scope) => scope,
            Err(e) => {
                tracing::warn!(client_id = %client_id, error = %e, "Rejected requested scopes");
                return Ok(redirect_error(
                    &e,
                    &redirect.uri,
                    response_type.response_mode(),
                    request.state.clone(),
                ));
            }
        };

        tracing::debug!(
            client_id = %client_id,
            response_type = %response_type,
            redirect_uri = %redirect.uri,
            scope = %scope,
            "Authorization request validated"
        );

        Ok(AuthorizationOutcome::RenderConsent(ValidatedRequest {
            application,
            response_type,
            redirect_uri: redirect.uri,
            redirect_uri_provided: redirect.provided,
            scope,
            state: request.state.clone(),
            owner: owner.clone(),
        }))
    }

    /// Applies the owner's decision to a validated request.
    ///
    /// Denial redirects with `access_denied`. Approval issues an access token
    /// (implicit, delivered in the fragment) or an authorization code
    /// (delivered in the query). Confirmed scopes outside the validated set
    /// redirect with `invalid_scope`; issuance failures with `server_error`.
    pub async fn decide(
        &self,
        request: &ValidatedRequest,
        decision: &ConsentDecision,
    ) -> AuthorizationOutcome {
        let mode = request.response_mode();

        if !decision.allow {
            tracing::warn!(
                client_id = %request.client_id(),
                user_id = %request.owner.id,
                "Resource owner denied authorization"
            );
            let response = AuthorizationError {
                error: AuthorizationErrorCode::AccessDenied,
                error_description: None,
                state: request.state.clone(),
            };
            return AuthorizationOutcome::RedirectError {
                location: response.to_redirect_url(&request.redirect_uri, mode),
                error: AuthorizationErrorCode::AccessDenied,
            };
        }

        let scope = match &decision.scopes {
            Some(confirmed) if !confirmed.is_empty() => {
                if !confirmed.is_subset(&request.scope) {
                    let error = AuthError::invalid_scope(format!(
                        "Confirmed scope(s) not requested: {}",
                        confirmed.difference(&request.scope).join(" ")
                    ));
                    return redirect_error(
                        &error,
                        &request.redirect_uri,
                        mode,
                        request.state.clone(),
                    );
                }
                confirmed.clone()
            }
            _ => request.scope.clone(),
        };

        let response = match request.response_type {
            ResponseType::Token => self
                .issuer
                .issue_tokens(request.client_id(), Some(&request.owner.id), scope, false)
                .await
                .map(|issued| AuthorizationResponse::Token {
                    access_token: issued.access_token,
                    expires_in: issued.expires_in,
                    scope: issued.scope,
                    state: request.state.clone(),
                }),
            ResponseType::Code => self
                .issuer
                .issue_code(request, scope)
                .await
                .map(|grant| AuthorizationResponse::Code {
                    code: grant.code,
                    state: request.state.clone(),
                }),
        };

        match response {
            Ok(response) => AuthorizationOutcome::RedirectSuccess {
                location: response.to_redirect_url(&request.redirect_uri),
            },
            Err(e) => {
                tracing::error!(
                    client_id = %request.client_id(),
                    error = %e,
                    "Failed to issue authorization response"
                );
                redirect_error(&e, &request.redirect_uri, mode, request.state.clone())
            }
        }
    }

    /// Handles a consent form submission.
    ///
    /// The submitted parameters are validated again exactly as in
    /// [`authorize`](Self::authorize), so a tampered redirect URI or client
    /// is rejected before the decision is applied.
    ///
    /// # Errors
    ///
    /// Returns an error only if the client registry fails.
    pub async fn submit_consent(
        &self,
        request: &AuthorizationRequest,
        owner: &ResourceOwner,
        decision: &ConsentDecision,
    ) -> AuthResult<AuthorizationOutcome> {
        match self.authorize(request, owner).await? {
            AuthorizationOutcome::RenderConsent(validated) => {
                Ok(self.decide(&validated, decision).await)
            }
            rejected => Ok(rejected),
        }
    }
}

fn direct_error(error: &AuthError) -> AuthorizationOutcome {
    AuthorizationOutcome::DirectError {
        status: 400,
        error: AuthorizationErrorCode::from(error),
        description: error.to_string(),
    }
}

fn redirect_error(
    error: &AuthError,
    redirect_uri: &str,
    mode: ResponseMode,
    state: Option<String>,
) -> AuthorizationOutcome {
    let response = AuthorizationError::from_auth_error(error, state);
    AuthorizationOutcome::RedirectError {
        location: response.to_redirect_url(redirect_uri, mode),
        error: response.error,
    }
}
