//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! claim bot test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data for common entities
//! - `builders`: Builder patterns for test data construction
//! - `fakes`: Recording implementations of the chat ports
//! - `database`: In-memory SQLite helpers for integration tests
//! - `assertions`: Custom assertion helpers for conversation transcripts
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod fakes;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use fakes::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
