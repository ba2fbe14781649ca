//! Infrastructure Database Layer
//!
//! This crate provides PostgreSQL persistence for the school billing system
//! using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern: each repository implements a
//! domain port (`BillingStore`, `StudentDirectory`) over a shared connection
//! pool, hiding SQL and row mapping from the domain layer. Queries are built
//! at runtime rather than with the SQLx macros so the crate compiles without
//! a database at hand.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{DatabaseConfig, create_pool, PgBillingStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/driveschool")).await?;
//! let store = PgBillingStore::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;

pub use pool::{DatabasePool, create_pool, create_pool_from_url, DatabaseConfig};
pub use error::DatabaseError;
pub use repositories::{PgBillingStore, PgStudentDirectory};

/// Runs the embedded migrations against the pool
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), DatabaseError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
}
