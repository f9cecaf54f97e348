//! Authorization codes.
//!
//! A grant is created when the resource owner allows a `response_type=code`
//! request and is consumed exactly once at the token endpoint.
//!
//! # Security
//!
//! - Codes are 256-bit random values, base64url-encoded
//! - Codes are short-lived (default 10 minutes)
//! - Codes are single-use; storage marks them consumed atomically

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::types::ScopeSet;
use crate::types::token::generate_token_value;

/// A single-use authorization code bound to client, owner, redirect URI and scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationGrant {
    /// Unique record identifier.
    pub id: Uuid,

    /// The authorization code handed to the client.
    pub code: String,

    /// Client the code was issued to.
    pub client_id: String,

    /// Resource owner who approved the request.
    pub user_id: String,

    /// Redirect URI the code was delivered to.
    pub redirect_uri: String,

    /// Whether `redirect_uri` appeared in the authorization request.
    /// When it was defaulted, the token request may omit it.
    pub redirect_uri_provided: bool,

    /// Granted scopes.
    pub scope: ScopeSet,

    /// When the code was issued.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the code stops being redeemable.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// When the code was redeemed, if it was.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub consumed_at: Option<OffsetDateTime>,
}

impl AuthorizationGrant {
    /// Generates a new authorization code.
    #[must_use]
    pub fn generate_code() -> String {
        generate_token_value()
    }

    /// Returns `true` if the code has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() >= self.expires_at
    }

    /// Returns `true` if the code has been redeemed.
    #[must_use]
    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }

    /// Returns `true` if the code can still be redeemed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_expired() && !self.is_consumed()
    }

    /// Checks the redirect URI presented at the token endpoint.
    ///
    /// A presented URI must equal the one the code was delivered to. Omitting
    /// it is only allowed when the authorization request omitted it too.
    #[must_use]
    pub fn redirect_uri_matches(&self, presented: Option<&str>) -> bool {
        match presented {
            Some(uri) => uri == self.redirect_uri,
            None => !self.redirect_uri_provided,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn make_grant(redirect_uri_provided: bool) -> AuthorizationGrant {
        let now = OffsetDateTime::now_utc();
        AuthorizationGrant {
            id: Uuid::new_v4(),
            code: AuthorizationGrant::generate_code(),
            client_id: "client".to_string(),
            user_id: "user".to_string(),
            redirect_uri: "http://localhost".to_string(),
            redirect_uri_provided,
            scope: ScopeSet::parse("read"),
            created_at: now,
            expires_at: now + Duration::minutes(10),
            consumed_at: None,
        }
    }

    #[test]
    fn test_generate_code_unique() {
        let a = AuthorizationGrant::generate_code();
        let b = AuthorizationGrant::generate_code();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
    }

    #[test]
    fn test_validity() {
        let mut grant = make_grant(true);
        assert!(grant.is_valid());

        grant.consumed_at = Some(OffsetDateTime::now_utc());
        assert!(grant.is_consumed());
        assert!(!grant.is_valid());

        let mut grant = make_grant(true);
        grant.expires_at = OffsetDateTime::now_utc() - Duration::seconds(1);
        assert!(grant.is_expired());
        assert!(!grant.is_valid());
    }

    #[test]
    fn test_redirect_uri_matches_explicit() {
        let grant = make_grant(true);
        assert!(grant.redirect_uri_matches(Some("http://localhost")));
        assert!(!grant.redirect_uri_matches(Some("http://localhost/")));
        assert!(!grant.redirect_uri_matches(None));
    }

    #[test]
    fn test_redirect_uri_matches_defaulted() {
        let grant = make_grant(false);
        assert!(grant.redirect_uri_matches(None));
        assert!(grant.redirect_uri_matches(Some("http://localhost")));
        assert!(!grant.redirect_uri_matches(Some("http://example.it")));
    }
}
