//! Token revocation request types (RFC 7009).

use serde::{Deserialize, Serialize};

/// Hint about the type of token being revoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenTypeHint {
    /// The token is an access token.
    AccessToken,
    /// The token is a refresh token.
    RefreshToken,
}

/// Revocation endpoint request body.
#[derive(Debug, Clone, Deserialize)]
pub struct RevocationRequest {
    /// The token to revoke.
    pub token: String,

    /// Which store to search first. Both are searched regardless.
    #[serde(default)]
    pub token_type_hint: Option<TokenTypeHint>,

    /// Client identifier, when not sent via HTTP Basic.
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client secret, when not sent via HTTP Basic.
    #[serde(default)]
    pub client_secret: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_with_hint() {
        let request: RevocationRequest = serde_json::from_value(serde_json::json!({
            "token": "abc",
            "token_type_hint": "refresh_token",
        }))
        .unwrap();
        assert_eq!(request.token_type_hint, Some(TokenTypeHint::RefreshToken));
        assert!(request.client_id.is_none());
    }

    #[test]
    fn test_deserialize_without_hint() {
        let request: RevocationRequest =
            serde_json::from_value(serde_json::json!({ "token": "abc" })).unwrap();
        assert!(request.token_type_hint.is_none());
    }
}
