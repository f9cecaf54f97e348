//! Shared fixtures for the in-memory integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use tracing_subscriber::EnvFilter;
use warden_auth::config::AuthConfig;
use warden_auth::identity::ResourceOwner;
use warden_auth::oauth::{AuthorizationService, TokenIssuer};
use warden_auth::secret::hash_secret;
use warden_auth::storage::ClientRegistry;
use warden_auth::token::{ResourceGuard, TokenService};
use warden_auth::types::{Application, ClientType, GrantType};
use warden_auth_memory::{InMemoryAuthStorage, InMemoryIdentityProvider};

pub const IMPLICIT_CLIENT: &str = "implicit-app";
pub const CODE_CLIENT: &str = "code-app";
pub const OTHER_CODE_CLIENT: &str = "other-code-app";
pub const PASSWORD_CLIENT: &str = "password-app";
pub const SERVICE_CLIENT: &str = "service-app";
pub const SERVICE_SECRET: &str = "service-secret";
pub const REDIRECT_URIS: &str = "http://localhost http://example.com http://example.it";
pub const STATE: &str = "random_state_string";

static TRACING: Once = Once::new();

/// Installs a test subscriber once. `RUST_LOG` overrides the `warn` default.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Every service wired to one set of in-memory stores.
pub struct Harness {
    pub config: AuthConfig,
    pub storage: InMemoryAuthStorage,
    pub authorization: AuthorizationService,
    pub tokens: TokenService,
    pub guard: ResourceGuard,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_config(AuthConfig::default()).await
    }

    pub async fn with_config(config: AuthConfig) -> Self {
        init_tracing();

        let storage = InMemoryAuthStorage::new();
        register_clients(storage.clients().as_ref()).await;

        let identity = InMemoryIdentityProvider::new();
        identity
            .add_user("test_user", "user-test", "123456")
            .expect("hash password");

        let issuer = Arc::new(TokenIssuer::new(
            storage.grants(),
            storage.tokens(),
            &config.oauth,
        ));
        let authorization =
            AuthorizationService::new(storage.clients(), Arc::clone(&issuer), &config);
        let tokens = TokenService::new(
            storage.clients(),
            storage.grants(),
            storage.tokens(),
            issuer,
            &config,
        )
        .with_identity_provider(Arc::new(identity));
        let guard = ResourceGuard::new(storage.tokens(), &config);

        Self {
            config,
            storage,
            authorization,
            tokens,
            guard,
        }
    }
}

async fn register_clients(registry: &dyn ClientRegistry) {
    let applications = [
        Application::new(
            IMPLICIT_CLIENT,
            "Test Implicit Application",
            ClientType::Public,
            GrantType::Implicit,
        )
        .with_redirect_uris(REDIRECT_URIS)
        .with_owner("dev-user"),
        Application::new(
            CODE_CLIENT,
            "Test Code Application",
            ClientType::Public,
            GrantType::AuthorizationCode,
        )
        .with_redirect_uris(REDIRECT_URIS)
        .with_owner("dev-user"),
        Application::new(
            OTHER_CODE_CLIENT,
            "Second Code Application",
            ClientType::Public,
            GrantType::AuthorizationCode,
        )
        .with_redirect_uris(REDIRECT_URIS),
        Application::new(
            PASSWORD_CLIENT,
            "Test Password Application",
            ClientType::Public,
            GrantType::Password,
        ),
        Application::new(
            SERVICE_CLIENT,
            "Test Service Application",
            ClientType::Confidential,
            GrantType::ClientCredentials,
        )
        .with_secret_hash(hash_secret(SERVICE_SECRET).expect("hash secret")),
    ];

    for application in &applications {
        registry.create(application).await.expect("register client");
    }
}

pub fn test_user() -> ResourceOwner {
    ResourceOwner::new("user-test")
}

/// Splits the fragment or query of a redirect location into pairs.
pub fn response_params(location: &str) -> Vec<(String, String)> {
    let url = url::Url::parse(location).expect("valid redirect location");
    let encoded = url.fragment().or(url.query()).unwrap_or_default().to_string();
    url::form_urlencoded::parse(encoded.as_bytes())
        .into_owned()
        .collect()
}

pub fn param(params: &[(String, String)], name: &str) -> Option<String> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.clone())
}
