//! In-memory backends for warden-auth.
//!
//! Provides `dashmap`-backed implementations of:
//!
//! - [`ClientRegistry`](warden_auth::storage::ClientRegistry)
//! - [`GrantStorage`](warden_auth::storage::GrantStorage)
//! - [`TokenStorage`](warden_auth::storage::TokenStorage)
//! - [`IdentityProvider`](warden_auth::identity::IdentityProvider)
//!
//! Nothing survives a restart. Intended for tests, demos and single-process
//! deployments.
//!
//! # Example
//!
//! ```ignore
//! use warden_auth_memory::InMemoryAuthStorage;
//!
//! let storage = InMemoryAuthStorage::new();
//! storage.clients().create(&application).await?;
//!
//! let issuer = Arc::new(TokenIssuer::new(storage.grants(), storage.tokens(), &config.oauth));
//! ```

pub mod client;
pub mod grant;
pub mod identity;
pub mod token;

use std::sync::Arc;

pub use client::InMemoryClientRegistry;
pub use grant::InMemoryGrantStorage;
pub use identity::InMemoryIdentityProvider;
pub use token::InMemoryTokenStorage;

/// Bundle of the in-memory stores, shareable across services.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuthStorage {
    clients: Arc<InMemoryClientRegistry>,
    grants: Arc<InMemoryGrantStorage>,
    tokens: Arc<InMemoryTokenStorage>,
}

impl InMemoryAuthStorage {
    /// Creates empty stores.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the client registry.
    #[must_use]
    pub fn clients(&self) -> Arc<InMemoryClientRegistry> {
        Arc::clone(&self.clients)
    }

    /// Returns the authorization code store.
    #[must_use]
    pub fn grants(&self) -> Arc<InMemoryGrantStorage> {
        Arc::clone(&self.grants)
    }

    /// Returns the token store.
    #[must_use]
    pub fn tokens(&self) -> Arc<InMemoryTokenStorage> {
        Arc::clone(&self.tokens)
    }

    /// Drops expired codes and tokens from every store.
    ///
    /// # Returns
    ///
    /// Returns the total number of records removed.
    pub fn cleanup_expired(&self) -> u64 {
        self.grants.cleanup_expired() + self.tokens.cleanup_expired()
    }
}
