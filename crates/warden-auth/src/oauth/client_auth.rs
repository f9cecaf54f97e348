//! Client authentication for the token and revocation endpoints.
//!
//! # Authentication Priority
//!
//! 1. HTTP Basic header (`client_secret_basic`)
//! 2. `client_id` and `client_secret` in the body (`client_secret_post`)
//! 3. `client_id` alone, public clients only
//!
//! A public client that also sends a secret is authenticated by `client_id`;
//! the secret is ignored.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::AuthResult;
use crate::error::AuthError;
use crate::secret::verify_secret;
use crate::storage::ClientRegistry;
use crate::types::Application;

/// Client credentials as presented with a request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientCredentials<'a> {
    /// Raw `Authorization` header value, if any.
    pub authorization: Option<&'a str>,

    /// `client_id` body parameter.
    pub client_id: Option<&'a str>,

    /// `client_secret` body parameter.
    pub client_secret: Option<&'a str>,
}

/// Parses an HTTP Basic `Authorization` header into `(client_id, client_secret)`.
///
/// # Errors
///
/// Returns `AuthError::InvalidClient` if the header is not `Basic`, not valid
/// base64/UTF-8, or has no `:` separator.
pub fn parse_basic_auth(header: &str) -> AuthResult<(String, String)> {
    let credentials = header
        .strip_prefix("Basic ")
        .ok_or_else(|| AuthError::invalid_client("Authorization header must start with 'Basic '"))?;

    let decoded = STANDARD
        .decode(credentials.trim())
        .map_err(|_| AuthError::invalid_client("Invalid base64 encoding in Authorization header"))?;

    let decoded = String::from_utf8(decoded)
        .map_err(|_| AuthError::invalid_client("Invalid UTF-8 in decoded credentials"))?;

    let (client_id, client_secret) = decoded
        .split_once(':')
        .ok_or_else(|| AuthError::invalid_client("Credentials must be in format 'id:secret'"))?;

    Ok((client_id.to_string(), client_secret.to_string()))
}

/// Authenticates the calling client.
///
/// # Errors
///
/// Returns `AuthError::InvalidClient` if:
/// - No client identifier was presented
/// - The client is not registered
/// - A confidential client presented no secret or a wrong one
pub async fn authenticate_client(
    credentials: ClientCredentials<'_>,
    client_registry: &dyn ClientRegistry,
) -> AuthResult<Application> {
    let (client_id, client_secret) = match credentials.authorization {
        Some(header) => {
            let (id, secret) = parse_basic_auth(header)?;
            (id, Some(secret))
        }
        None => {
            let id = credentials
                .client_id
                .filter(|id| !id.is_empty())
                .ok_or_else(|| AuthError::invalid_client("No client credentials provided"))?;
            (id.to_string(), credentials.client_secret.map(str::to_string))
        }
    };

    let application = client_registry
        .find_by_client_id(&client_id)
        .await?
        .ok_or_else(|| AuthError::invalid_client("Unknown client"))?;

    if !application.is_confidential() {
        return Ok(application);
    }

    let presented = client_secret
        .ok_or_else(|| AuthError::invalid_client("Confidential clients must provide a secret"))?;
    let stored = application
        .client_secret
        .as_deref()
        .ok_or_else(|| AuthError::invalid_client("Client has no secret configured"))?;

    let matches = verify_secret(&presented, stored).map_err(|e| {
        tracing::error!(client_id = %client_id, error = %e, "Stored client secret hash is malformed");
        AuthError::internal("Malformed client secret hash")
    })?;

    if !matches {
        tracing::warn!(client_id = %client_id, "Client secret mismatch");
        return Err(AuthError::invalid_client("Invalid client secret"));
    }

    Ok(application)
}
