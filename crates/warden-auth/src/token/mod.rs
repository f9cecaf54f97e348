//! Token endpoint, revocation and bearer token validation.
//!
//! - [`service`] - Code exchange, refresh, client credentials and password grants
//! - [`revocation`] - Revocation request types (RFC 7009)
//! - [`bearer`] - Protected resource guard

pub mod bearer;
pub mod revocation;
pub mod service;

pub use bearer::{AccessContext, ResourceGuard, extract_bearer};
pub use revocation::{RevocationRequest, TokenTypeHint};
pub use service::TokenService;
