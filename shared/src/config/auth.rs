//! Authentication configuration

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Default token lifetime in minutes
pub const DEFAULT_EXPIRY_MINUTES: i64 = 60;

/// JWT authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Symmetric signing key
    pub key: String,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,

    /// Token lifetime in minutes
    #[serde(default = "default_expiry_minutes")]
    pub expiry_minutes: i64,
}

impl JwtConfig {
    /// Create a new JWT configuration
    pub fn new(
        key: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            expiry_minutes: DEFAULT_EXPIRY_MINUTES,
        }
    }

    /// Load from `JWT_KEY`, `JWT_ISSUER`, `JWT_AUDIENCE` and `JWT_EXPIRY_MINUTES`.
    ///
    /// Key, issuer and audience have no defaults: startup must fail when
    /// any of them is absent.
    pub fn from_env() -> Result<Self, ConfigError> {
        let key = required("JWT_KEY")?;
        let issuer = required("JWT_ISSUER")?;
        let audience = required("JWT_AUDIENCE")?;
        let expiry_minutes = std::env::var("JWT_EXPIRY_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_EXPIRY_MINUTES);

        Ok(Self {
            key,
            issuer,
            audience,
            expiry_minutes,
        })
    }

    /// Set token lifetime in minutes
    pub fn with_expiry_minutes(mut self, minutes: i64) -> Self {
        self.expiry_minutes = minutes;
        self
    }
}

fn required(variable: &'static str) -> Result<String, ConfigError> {
    match std::env::var(variable) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing { variable }),
    }
}

fn default_expiry_minutes() -> i64 {
    DEFAULT_EXPIRY_MINUTES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_default_expiry() {
        let config = JwtConfig::new("k", "storefront", "storefront-api");
        assert_eq!(config.expiry_minutes, 60);
        assert_eq!(config.with_expiry_minutes(5).expiry_minutes, 5);
    }

    #[test]
    fn test_deserialize_defaults_expiry() {
        let config: JwtConfig = serde_json::from_str(
            r#"{"key":"secret","issuer":"iss","audience":"aud"}"#,
        )
        .unwrap();
        assert_eq!(config.expiry_minutes, DEFAULT_EXPIRY_MINUTES);
    }
}
