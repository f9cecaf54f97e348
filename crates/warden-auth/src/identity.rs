//! Resource owner identity.
//!
//! The engine never authenticates users itself. For the authorization
//! endpoint the transport passes in an already authenticated
//! [`ResourceOwner`]; for the password grant the token service asks an
//! [`IdentityProvider`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::AuthResult;

/// An authenticated resource owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceOwner {
    /// Stable user identifier.
    pub id: String,
}

impl ResourceOwner {
    /// Creates a resource owner reference.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Verifies resource-owner credentials for the password grant.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authenticates a username/password pair.
    ///
    /// # Returns
    ///
    /// Returns `Some(owner)` on success and `None` for unknown users or wrong
    /// passwords. Implementations must not distinguish the two.
    ///
    /// # Errors
    ///
    /// Returns an error only if the identity backend fails.
    async fn authenticate(&self, username: &str, password: &str)
    -> AuthResult<Option<ResourceOwner>>;
}
