//! Token service module for JWT management
//!
//! Issues and validates signed, time-bound identity tokens. The service is
//! stateless: there is no revocation list and logout is a client-side
//! discard.

mod config;
mod service;


pub use config::TokenServiceConfig;
pub use service::TokenService;
