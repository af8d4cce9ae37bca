//! Repository implementations
//!
//! Repositories encapsulate SQL queries and map between database rows and
//! plain row structs. Domain translation happens in the adapters.

pub mod claims;

pub use claims::{ClaimsRepository, ClaimRow};
