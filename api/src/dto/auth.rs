use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sf_core::domain::entities::Claims;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100))]
    pub last_name: String,

    #[validate(email, length(max = 255))]
    pub email: String,

    /// Minimum length is enforced by the auth service
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenValidationRequest {
    #[serde(default)]
    pub token: String,
}

/// Body of every auth and token-validation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl AuthResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            token: None,
            expires_at: None,
            user_id: None,
            email: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::ok(message)
        }
    }

    /// A freshly issued token
    pub fn issued(message: impl Into<String>, issued: sf_core::domain::value_objects::AuthResponse) -> Self {
        Self {
            token: Some(issued.token),
            expires_at: Some(issued.expires_at),
            user_id: Some(issued.user_id),
            email: Some(issued.email),
            ..Self::ok(message)
        }
    }

    /// Identity carried by validated claims
    pub fn from_claims(message: impl Into<String>, claims: &Claims) -> Self {
        Self {
            expires_at: Some(claims.expires_at()),
            user_id: claims.user_id(),
            email: Some(claims.email.clone()),
            ..Self::ok(message)
        }
    }
}
