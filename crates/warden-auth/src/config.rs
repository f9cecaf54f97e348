//! Authorization server configuration.
//!
//! Configuration is an explicit value handed to the services at construction
//! time. It can be built in code with the `with_*` helpers or loaded from TOML.
//!
//! # Example (TOML)
//!
//! ```toml
//! scopes = ["read", "write", "groups"]
//! default_scopes = ["read"]
//!
//! [oauth]
//! authorization_code_lifetime = "1m"
//! access_token_lifetime = "10h"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root authorization server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Server-wide set of scopes a client may request.
    pub scopes: Vec<String>,

    /// Scopes granted when a request names none.
    /// Empty means every scope in `scopes`.
    pub default_scopes: Vec<String>,

    /// Scope required by safe (read-only) resource requests.
    pub read_scope: String,

    /// Scope required by unsafe (mutating) resource requests.
    pub write_scope: String,

    /// OAuth 2.0 lifetimes and refresh behaviour.
    pub oauth: OAuthConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            scopes: vec!["read".to_string(), "write".to_string()],
            default_scopes: Vec::new(),
            read_scope: "read".to_string(),
            write_scope: "write".to_string(),
            oauth: OAuthConfig::default(),
        }
    }
}

/// OAuth 2.0 configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// Authorization code lifetime.
    #[serde(with = "humantime_serde")]
    pub authorization_code_lifetime: Duration,

    /// Access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Refresh token lifetime.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,

    /// Rotate refresh tokens on use.
    /// The presented token and its access token are revoked and a new pair is issued.
    pub refresh_token_rotation: bool,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            authorization_code_lifetime: Duration::from_secs(600), // 10 minutes
            access_token_lifetime: Duration::from_secs(3600),      // 1 hour
            refresh_token_lifetime: Duration::from_secs(90 * 24 * 3600), // 90 days
            refresh_token_rotation: true,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),

    /// The configuration file could not be read.
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for this schema.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl AuthConfig {
    /// Parses and validates a TOML configuration document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML and any error from
    /// [`AuthConfig::validate`].
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise the
    /// same errors as [`AuthConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Sets the server-wide allowed scopes.
    #[must_use]
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the scopes granted when a request names none.
    #[must_use]
    pub fn with_default_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the authorization code lifetime.
    #[must_use]
    pub fn with_authorization_code_lifetime(mut self, lifetime: Duration) -> Self {
        self.oauth.authorization_code_lifetime = lifetime;
        self
    }

    /// Sets the access token lifetime.
    #[must_use]
    pub fn with_access_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.oauth.access_token_lifetime = lifetime;
        self
    }

    /// Sets the refresh token lifetime.
    #[must_use]
    pub fn with_refresh_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.oauth.refresh_token_lifetime = lifetime;
        self
    }

    /// Sets whether refresh tokens are rotated on use.
    #[must_use]
    pub fn with_refresh_token_rotation(mut self, rotate: bool) -> Self {
        self.oauth.refresh_token_rotation = rotate;
        self
    }

    /// Returns the scopes granted when a request names none.
    #[must_use]
    pub fn effective_default_scopes(&self) -> &[String] {
        if self.default_scopes.is_empty() {
            &self.scopes
        } else {
            &self.default_scopes
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no scopes are configured, and
    /// `ConfigError::InvalidValue` if:
    /// - A scope is empty or contains whitespace
    /// - A default, read or write scope is not among the allowed scopes
    /// - Any lifetime is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scopes.is_empty() {
            return Err(ConfigError::Missing("scopes".to_string()));
        }

        for scope in &self.scopes {
            if scope.is_empty() || scope.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidValue(format!(
                    "Invalid scope token: '{}'",
                    scope
                )));
            }
        }

        for scope in &self.default_scopes {
            if !self.scopes.contains(scope) {
                return Err(ConfigError::InvalidValue(format!(
                    "Default scope '{}' is not an allowed scope",
                    scope
                )));
            }
        }

        for (name, scope) in [("read_scope", &self.read_scope), ("write_scope", &self.write_scope)] {
            if !self.scopes.contains(scope) {
                return Err(ConfigError::InvalidValue(format!(
                    "{} '{}' is not an allowed scope",
                    name, scope
                )));
            }
        }

        let lifetimes = [
            (
                "authorization_code_lifetime",
                self.oauth.authorization_code_lifetime,
            ),
            ("access_token_lifetime", self.oauth.access_token_lifetime),
            ("refresh_token_lifetime", self.oauth.refresh_token_lifetime),
        ];
        for (name, lifetime) in lifetimes {
            if lifetime.is_zero() {
                return Err(ConfigError::InvalidValue(format!("{} must be > 0", name)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuthConfig::default();
        assert_eq!(config.scopes, vec!["read", "write"]);
        assert!(config.default_scopes.is_empty());
        assert_eq!(config.effective_default_scopes(), &config.scopes[..]);
        assert!(config.oauth.refresh_token_rotation);
        assert_eq!(
            config.oauth.authorization_code_lifetime,
            Duration::from_secs(600)
        );
    }

    #[test]
    fn test_default_config_validates() {
        assert!(AuthConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_toml_applies_defaults() {
        let config = AuthConfig::from_toml_str(
            r#"
            scopes = ["read", "write", "groups"]
            default_scopes = ["read"]

            [oauth]
            authorization_code_lifetime = "1m"
            access_token_lifetime = "10h"
            "#,
        )
        .unwrap();

        assert_eq!(config.scopes.len(), 3);
        assert_eq!(config.effective_default_scopes(), &["read".to_string()]);
        assert_eq!(
            config.oauth.authorization_code_lifetime,
            Duration::from_secs(60)
        );
        assert_eq!(
            config.oauth.access_token_lifetime,
            Duration::from_secs(36000)
        );
        assert_eq!(
            config.oauth.refresh_token_lifetime,
            Duration::from_secs(90 * 24 * 3600)
        );
        assert_eq!(config.read_scope, "read");
    }

    #[test]
    fn test_empty_scopes_rejected() {
        let config = AuthConfig::default().with_scopes(Vec::<String>::new());
        assert!(matches!(config.validate(), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn test_default_scope_outside_allowed_rejected() {
        let config = AuthConfig::default().with_default_scopes(["admin"]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_whitespace_scope_rejected() {
        let config = AuthConfig::default().with_scopes(["read", "write", "bad scope"]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_zero_lifetime_rejected() {
        let config = AuthConfig::default().with_access_token_lifetime(Duration::ZERO);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("access_token_lifetime"));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let result = AuthConfig::from_toml_str("scopes = read");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warden.toml");
        std::fs::write(&path, "scopes = [\"read\", \"write\"]\n[oauth]\nrefresh_token_rotation = false\n")
            .unwrap();

        let config = AuthConfig::load(&path).unwrap();
        assert!(!config.oauth.refresh_token_rotation);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = AuthConfig::load(dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
