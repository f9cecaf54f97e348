//! Client registry trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Application;

/// Read/write access to registered applications.
///
/// The authorization and token services only read through this trait; the
/// write operations exist for registration tooling and tests.
#[async_trait]
pub trait ClientRegistry: Send + Sync {
    /// Finds an application by its client identifier.
    ///
    /// # Returns
    ///
    /// Returns `Some(application)` if registered, `None` otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Application>>;

    /// Registers a new application.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Conflict` if the client identifier is taken, or an
    /// error if the storage operation fails.
    async fn create(&self, application: &Application) -> AuthResult<()>;

    /// Deletes an application.
    ///
    /// Grants and tokens already issued to the client are left to the grant
    /// and token stores.
    ///
    /// # Returns
    ///
    /// Returns `true` if an application was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete(&self, client_id: &str) -> AuthResult<bool>;

    /// Lists every registered application.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn list(&self) -> AuthResult<Vec<Application>>;
}
