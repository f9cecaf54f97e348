//! In-memory client registry.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use warden_auth::AuthResult;
use warden_auth::error::AuthError;
use warden_auth::storage::ClientRegistry;
use warden_auth::types::Application;

/// Client registry keyed by `client_id`.
///
/// Applications are validated on registration.
#[derive(Debug, Default)]
pub struct InMemoryClientRegistry {
    applications: DashMap<String, Application>,
}

impl InMemoryClientRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered applications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.applications.len()
    }

    /// Returns `true` if no application is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
    }
}

#[async_trait]
impl ClientRegistry for InMemoryClientRegistry {
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Application>> {
        Ok(self
            .applications
            .get(client_id)
            .map(|entry| entry.value().clone()))
    }

    async fn create(&self, application: &Application) -> AuthResult<()> {
        application
            .validate()
            .map_err(|e| AuthError::invalid_request(e.to_string()))?;

        match self.applications.entry(application.client_id.clone()) {
            Entry::Occupied(_) => Err(AuthError::conflict(format!(
                "Client '{}' already exists",
                application.client_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(application.clone());
                tracing::info!(
                    client_id = %application.client_id,
                    grant_type = %application.authorization_grant_type,
                    "Registered application"
                );
                Ok(())
            }
        }
    }

    async fn delete(&self, client_id: &str) -> AuthResult<bool> {
        Ok(self.applications.remove(client_id).is_some())
    }

    async fn list(&self) -> AuthResult<Vec<Application>> {
        let mut applications: Vec<Application> = self
            .applications
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        applications.sort_by(|a, b| a.client_id.cmp(&b.client_id));
        Ok(applications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_auth::types::{ClientType, GrantType};

    fn implicit_app(client_id: &str) -> Application {
        Application::new(client_id, "Test App", ClientType::Public, GrantType::Implicit)
            .with_redirect_uris("http://localhost http://example.it")
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let registry = InMemoryClientRegistry::new();
        registry.create(&implicit_app("app")).await.unwrap();

        let found = registry.find_by_client_id("app").await.unwrap().unwrap();
        assert_eq!(found.default_redirect_uri(), Some("http://localhost"));
        assert!(registry.find_by_client_id("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_client_id() {
        let registry = InMemoryClientRegistry::new();
        registry.create(&implicit_app("app")).await.unwrap();

        let err = registry.create(&implicit_app("app")).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_application_rejected() {
        let registry = InMemoryClientRegistry::new();
        let app = Application::new("app", "No URIs", ClientType::Public, GrantType::Implicit);

        let err = registry.create(&app).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidRequest { .. }));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_delete_and_list() {
        let registry = InMemoryClientRegistry::new();
        registry.create(&implicit_app("b")).await.unwrap();
        registry.create(&implicit_app("a")).await.unwrap();

        let ids: Vec<_> = registry
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|app| app.client_id)
            .collect();
        assert_eq!(ids, ["a", "b"]);

        assert!(registry.delete("a").await.unwrap());
        assert!(!registry.delete("a").await.unwrap());
    }
}
