//! Authorization code storage trait.
//!
//! # Implementation Notes
//!
//! Implementations must:
//!
//! - Reject a duplicate code with `AuthError::Conflict`
//! - Make `consume` atomic: of any number of concurrent redemptions of one
//!   code, exactly one may succeed
//! - Check expiry at consume time; a background sweeper is optional
//!
//! Codes are bearer secrets and must never be logged.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::AuthorizationGrant;

/// Storage for single-use authorization codes.
#[async_trait]
pub trait GrantStorage: Send + Sync {
    /// Persists a newly issued grant.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Conflict` if a grant with the same code exists, or
    /// an error if the storage operation fails.
    async fn put(&self, grant: &AuthorizationGrant) -> AuthResult<()>;

    /// Atomically redeems a code.
    ///
    /// The code must exist, be unexpired and unconsumed, belong to
    /// `client_id`, and satisfy [`AuthorizationGrant::redirect_uri_matches`]
    /// for `redirect_uri`. On success the grant is marked consumed and
    /// returned with `consumed_at` set.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidGrant` if any of the above checks fail, or
    /// a storage error.
    async fn consume(
        &self,
        code: &str,
        client_id: &str,
        redirect_uri: Option<&str>,
    ) -> AuthResult<AuthorizationGrant>;
}
