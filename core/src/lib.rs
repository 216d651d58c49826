//! # Storefront Core
//!
//! Domain layer for the storefront backend: entities and their row
//! mappings, the store abstraction with its in-memory implementation,
//! repositories bound to a unit of work, and the token and authentication
//! services.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;
pub mod store;

// Re-export commonly used types for convenience
pub use errors::{AuthError, ConstraintKind, DomainError, DomainResult, StoreError, TokenError};
pub use repositories::{Staged, UnitOfWork, UnitOfWorkFactory, UnitState};
pub use services::{AuthService, PasswordHasher, TokenService, TokenServiceConfig};
pub use store::{MemoryStore, Session};
