//! Claim Intake Domain
//!
//! This crate implements the claim intake conversation: the record a user
//! ends up filing, the state machine that collects its fields one prompt at a
//! time, and the store port that enforces one claim per user.
//!
//! # Conversation Lifecycle
//!
//! ```text
//! Idle -> AwaitingHandle -> AwaitingNetwork -> AwaitingWallet -> Completed
//!   \___________________________\___________________\__________-> Cancelled
//! ```

pub mod claim;
pub mod flow;
pub mod service;
pub mod ports;
pub mod error;

pub use claim::{ClaimRecord, ClaimStatus, Network};
pub use flow::{FlowSession, FlowState, ClaimIntent};
pub use service::{ClaimFlow, FlowOutcome};
pub use ports::ClaimStore;
pub use error::ClaimError;
