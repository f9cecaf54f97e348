//! Domain types shared by the services and storage traits.

pub mod application;
pub mod grant;
pub mod scope;
pub mod token;

pub use application::{Application, ApplicationValidationError, ClientType, GrantType};
pub use grant::AuthorizationGrant;
pub use scope::ScopeSet;
pub use token::{AccessToken, RefreshToken, generate_token_value, hash_token};
