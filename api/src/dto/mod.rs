//! Request and response bodies of the HTTP surface

pub mod auth;
pub mod product;
pub mod user;

pub use auth::{AuthResponse, LoginRequest, RegisterRequest, TokenValidationRequest};
pub use product::ProductRequest;
pub use user::UserRequest;
