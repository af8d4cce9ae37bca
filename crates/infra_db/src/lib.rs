//! Infrastructure Database Layer
//!
//! This crate provides durable claim storage for the intake bot on SQLite
//! using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern: `ClaimsRepository` owns the SQL,
//! and `SqliteClaimStore` adapts it to the domain's `ClaimStore` port,
//! translating rows and errors.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, SqliteClaimStore};
//!
//! let pool = create_pool(DatabaseConfig::new("sqlite://database.db?mode=rwc")).await?;
//! run_migrations(&pool).await?;
//! let store = SqliteClaimStore::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabasePool, create_pool, run_migrations, DatabaseConfig};
pub use error::DatabaseError;
pub use repositories::ClaimsRepository;
pub use adapters::SqliteClaimStore;
