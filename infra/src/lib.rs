//! # Storefront Infrastructure
//!
//! MySQL backend for the storefront store abstraction:
//! - **Connection pool** built from [`sf_shared::DatabaseConfig`]
//! - **Sessions** implementing [`sf_core::store::Session`] over pooled connections
//! - **Migrations** that create every table from the shared schema metadata
//!   and insert the fixed seed rows
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

use std::sync::Arc;

use sf_core::errors::StoreError;
use sf_core::repositories::UnitOfWorkFactory;
use sf_core::store::MemoryStore;
use sf_shared::{DatabaseBackend, DatabaseConfig};

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Open the store selected by `config` and return its unit-of-work factory.
///
/// The MySQL backend runs migrations first when the configuration asks for
/// it; the memory backend starts seeded.
pub async fn initialize(
    config: &DatabaseConfig,
) -> Result<Arc<dyn UnitOfWorkFactory>, InfrastructureError> {
    tracing::info!(backend = ?config.backend, "Initializing store");

    match config.backend {
        DatabaseBackend::Memory => Ok(Arc::new(MemoryStore::seeded()?)),
        #[cfg(feature = "mysql")]
        DatabaseBackend::Mysql => {
            let pool = database::DatabasePool::new(config.clone()).await?;
            if !pool.health_check().await? {
                return Err(InfrastructureError::Config(
                    "Database did not answer the startup health check".to_string(),
                ));
            }
            if config.run_migrations {
                pool.run_migrations().await?;
            }
            Ok(Arc::new(pool))
        }
        #[cfg(not(feature = "mysql"))]
        DatabaseBackend::Mysql => Err(InfrastructureError::Config(
            "MySQL support is not compiled in".to_string(),
        )),
    }
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store-level failure, including seed rows that violate the schema
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Schema creation or seeding failed
    #[error("Migration error: {0}")]
    Migration(String),
}
