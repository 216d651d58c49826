//! Configuration for the token service

use jsonwebtoken::Algorithm;
use sf_shared::config::auth::DEFAULT_EXPIRY_MINUTES;
use sf_shared::JwtConfig;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Symmetric signing secret
    pub jwt_secret: String,
    /// Expected and issued `iss` claim
    pub issuer: String,
    /// Expected and issued `aud` claim
    pub audience: String,
    /// JWT signing algorithm
    pub algorithm: Algorithm,
    /// Token lifetime in minutes
    pub expiry_minutes: i64,
}

impl TokenServiceConfig {
    pub fn new(
        jwt_secret: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            algorithm: Algorithm::HS256,
            expiry_minutes: DEFAULT_EXPIRY_MINUTES,
        }
    }

    pub fn with_expiry_minutes(mut self, minutes: i64) -> Self {
        self.expiry_minutes = minutes;
        self
    }
}

impl From<&JwtConfig> for TokenServiceConfig {
    fn from(config: &JwtConfig) -> Self {
        Self::new(&config.key, &config.issuer, &config.audience)
            .with_expiry_minutes(config.expiry_minutes)
    }
}
