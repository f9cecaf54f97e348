//! Access and refresh token records.
//!
//! # Security
//!
//! - Token values are 256-bit random values, base64url-encoded
//! - Storage only ever sees the SHA-256 hash of a value, never plaintext
//! - Tokens can be revoked individually; a revoked refresh token takes its
//!   access token with it

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::types::ScopeSet;

/// Generates a 256-bit random value encoded as base64url without padding.
#[must_use]
pub fn generate_token_value() -> String {
    let mut bytes = [0u8; 32];
    rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hashes a token value for storage and lookup (SHA-256, lowercase hex).
#[must_use]
pub fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

// =============================================================================
// Access Token
// =============================================================================

/// A persisted bearer access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    /// Unique record identifier.
    pub id: Uuid,

    /// SHA-256 hash of the token value.
    pub token_hash: String,

    /// Client the token was issued to.
    pub client_id: String,

    /// Resource owner. `None` for client-credentials tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Granted scopes.
    pub scope: ScopeSet,

    /// When the token was issued.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the token stops authenticating requests.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl AccessToken {
    /// Returns `true` if the token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() >= self.expires_at
    }

    /// Returns `true` if every scope in `required` was granted.
    #[must_use]
    pub fn allows_scopes(&self, required: &ScopeSet) -> bool {
        required.is_subset(&self.scope)
    }

    /// Returns `true` if the token is unexpired and grants `required`.
    #[must_use]
    pub fn is_valid(&self, required: &ScopeSet) -> bool {
        !self.is_expired() && self.allows_scopes(required)
    }

    /// Seconds left until expiry, clamped at zero.
    #[must_use]
    pub fn expires_in(&self) -> u64 {
        let remaining = self.expires_at - OffsetDateTime::now_utc();
        u64::try_from(remaining.whole_seconds()).unwrap_or(0)
    }
}

// =============================================================================
// Refresh Token
// =============================================================================

/// A persisted refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshToken {
    /// Unique record identifier.
    pub id: Uuid,

    /// SHA-256 hash of the token value.
    pub token_hash: String,

    /// Hash of the access token issued alongside this refresh token.
    pub access_token_hash: String,

    /// Client the token was issued to.
    pub client_id: String,

    /// Resource owner.
    pub user_id: String,

    /// Scopes of the original grant. Refreshing may narrow but never widen them.
    pub scope: ScopeSet,

    /// When the token was issued.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the token expires.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// When the token was revoked, if it was.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub revoked_at: Option<OffsetDateTime>,
}

impl RefreshToken {
    /// Returns `true` if the token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() >= self.expires_at
    }

    /// Returns `true` if the token has been revoked.
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Returns `true` if the token can still be exchanged.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_expired() && !self.is_revoked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn make_access_token(scope: &str, expires_at: OffsetDateTime) -> AccessToken {
        AccessToken {
            id: Uuid::new_v4(),
            token_hash: hash_token("value"),
            client_id: "client".to_string(),
            user_id: Some("user".to_string()),
            scope: ScopeSet::parse(scope),
            created_at: OffsetDateTime::now_utc(),
            expires_at,
        }
    }

    #[test]
    fn test_hash_token() {
        let hash = hash_token("test-token-value");

        // SHA-256 produces 64 hex characters
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_token("test-token-value"));
        assert_ne!(hash, hash_token("different-token"));
    }

    #[test]
    fn test_generate_token_value() {
        let token = generate_token_value();

        // 32 bytes base64url encoded = 43 characters
        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_generate_token_uniqueness() {
        let mut tokens: Vec<String> = (0..100).map(|_| generate_token_value()).collect();
        tokens.sort();
        tokens.dedup();
        assert_eq!(tokens.len(), 100);
    }

    #[test]
    fn test_access_token_scopes() {
        let token = make_access_token("read write", OffsetDateTime::now_utc() + Duration::hours(1));
        assert!(token.is_valid(&ScopeSet::parse("read")));
        assert!(token.is_valid(&ScopeSet::new()));
        assert!(!token.is_valid(&ScopeSet::parse("read admin")));
        assert!(token.expires_in() > 3500);
    }

    #[test]
    fn test_access_token_expired() {
        let token = make_access_token("read", OffsetDateTime::now_utc() - Duration::seconds(1));
        assert!(token.is_expired());
        assert!(!token.is_valid(&ScopeSet::new()));
        assert_eq!(token.expires_in(), 0);
    }

    #[test]
    fn test_refresh_token_validity() {
        let now = OffsetDateTime::now_utc();
        let mut token = RefreshToken {
            id: Uuid::new_v4(),
            token_hash: hash_token("refresh"),
            access_token_hash: hash_token("access"),
            client_id: "client".to_string(),
            user_id: "user".to_string(),
            scope: ScopeSet::parse("read"),
            created_at: now,
            expires_at: now + Duration::days(1),
            revoked_at: None,
        };
        assert!(token.is_valid());

        token.revoked_at = Some(now);
        assert!(token.is_revoked());
        assert!(!token.is_valid());
    }
}
