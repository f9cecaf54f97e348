//! OAuth 2.0 authorization endpoint.
//!
//! - [`validator`] - Redirect URI and scope rules
//! - [`authorize`] - Request, consent and outcome types
//! - [`service`] - Request validation and consent handling
//! - [`issuer`] - Code and token minting
//! - [`response`] - Query/fragment response encoding
//! - [`token`] - Token endpoint wire types
//! - [`client_auth`] - Client authentication

pub mod authorize;
pub mod client_auth;
pub mod issuer;
pub mod response;
pub mod service;
pub mod token;
pub mod validator;

pub use authorize::{
    AuthorizationOutcome, AuthorizationRequest, ConsentDecision, ResponseType, ValidatedRequest,
};
pub use client_auth::{ClientCredentials, authenticate_client, parse_basic_auth};
pub use issuer::{IssuedTokens, TokenIssuer};
pub use response::{
    AuthorizationError, AuthorizationErrorCode, AuthorizationResponse, ResponseMode,
    encode_redirect,
};
pub use service::AuthorizationService;
pub use token::{TokenErrorResponse, TokenRequest, TokenResponse};
pub use validator::{RequestValidator, ResolvedRedirect};
