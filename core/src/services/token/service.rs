//! Main token service implementation

use chrono::Duration;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

use crate::domain::entities::Claims;
use crate::errors::{DomainError, TokenError};

use super::config::TokenServiceConfig;

/// HS256 keys shorter than this are rejected at startup
pub const MIN_SECRET_BYTES: usize = 32;

/// Service for issuing and validating signed identity tokens
pub struct TokenService {
    config: TokenServiceConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .field("expiry_minutes", &self.config.expiry_minutes)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a new token service instance
    ///
    /// # Returns
    ///
    /// * `Err(DomainError::ConfigurationMissing)` - key, issuer or audience is empty
    /// * `Err(DomainError::Validation)` - the key is too short to sign with
    pub fn new(config: TokenServiceConfig) -> Result<Self, DomainError> {
        for (setting, value) in [
            ("JWT_KEY", &config.jwt_secret),
            ("JWT_ISSUER", &config.issuer),
            ("JWT_AUDIENCE", &config.audience),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::ConfigurationMissing {
                    setting: setting.to_string(),
                });
            }
        }
        if config.jwt_secret.len() < MIN_SECRET_BYTES {
            return Err(DomainError::validation(format!(
                "JWT_KEY must be at least {} bytes",
                MIN_SECRET_BYTES
            )));
        }

        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(config.algorithm);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "aud", "sub"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        })
    }

    /// Configured token lifetime in minutes
    pub fn expiry_minutes(&self) -> i64 {
        self.config.expiry_minutes
    }

    /// Claims for a fresh token with the configured lifetime
    pub fn claims_for(&self, user_id: i64, email: &str) -> Claims {
        self.claims_with_lifetime(user_id, email, Duration::minutes(self.config.expiry_minutes))
    }

    fn claims_with_lifetime(&self, user_id: i64, email: &str, lifetime: Duration) -> Claims {
        Claims::new(
            user_id.to_string(),
            email,
            &self.config.issuer,
            &self.config.audience,
            lifetime,
        )
    }

    /// Signs `claims` into a compact JWT
    pub fn sign(&self, claims: &Claims) -> Result<String, DomainError> {
        let header = Header::new(self.config.algorithm);
        encode(&header, claims, &self.encoding_key).map_err(|e| {
            DomainError::Token(TokenError::GenerationFailed {
                message: e.to_string(),
            })
        })
    }

    /// Issues a token for the user valid for the configured lifetime
    pub fn issue(&self, user_id: i64, email: &str) -> Result<String, DomainError> {
        self.sign(&self.claims_for(user_id, email))
    }

    /// Issues a token with an explicit lifetime, which may be negative
    pub fn issue_with_lifetime(
        &self,
        user_id: i64,
        email: &str,
        lifetime: Duration,
    ) -> Result<String, DomainError> {
        self.sign(&self.claims_with_lifetime(user_id, email, lifetime))
    }

    /// Verifies signature, issuer, audience and validity window.
    ///
    /// Any ordinary failure (malformed, tampered, expired, wrong issuer or
    /// audience) yields `None`.
    pub fn validate(&self, token: &str) -> Option<Claims> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(error) => {
                debug!(reason = ?error.kind(), "Token rejected");
                None
            }
        }
    }
}
