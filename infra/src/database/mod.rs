//! Database module - MySQL implementations using SQLx
//!
//! This module provides:
//! - Connection pool management
//! - A [`Session`](sf_core::store::Session) per pooled connection
//! - SQL generation from the store's query model
//! - Schema creation and seeding

pub mod connection;
pub mod errors;
pub mod migrations;
pub mod session;
pub mod sql;

// Re-export commonly used types
pub use connection::DatabasePool;
pub use session::MySqlSession;
