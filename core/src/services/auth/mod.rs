//! Authentication service module
//!
//! Registration, login, current-user lookup and token refresh on top of
//! the unit of work and the token service.

mod service;

#[cfg(test)]
mod tests;

pub use service::AuthService;
