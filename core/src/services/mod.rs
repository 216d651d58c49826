//! Business services containing domain logic and use cases.

pub mod auth;
pub mod password;
pub mod token;

pub use auth::AuthService;
pub use password::PasswordHasher;
pub use token::{TokenService, TokenServiceConfig};
