//! Domain Adapters
//!
//! This module provides adapter implementations for domain ports,
//! connecting domain interfaces to the SQLite database layer.
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::SqliteClaimStore;
//! use domain_claims::ClaimStore;
//!
//! let store = SqliteClaimStore::new(pool);
//! let filed = store.exists(user_id).await?;
//! ```

pub mod claims;

pub use claims::SqliteClaimStore;
