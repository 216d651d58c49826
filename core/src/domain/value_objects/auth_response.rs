//! Authentication response value object for API responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a successful register, login or refresh
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse {
    /// Signed bearer token
    pub token: String,

    /// Instant the token stops validating
    pub expires_at: DateTime<Utc>,

    pub user_id: i64,

    pub email: String,
}

impl AuthResponse {
    pub fn new(token: String, expires_at: DateTime<Utc>, user_id: i64, email: String) -> Self {
        Self {
            token,
            expires_at,
            user_id,
            email,
        }
    }
}
