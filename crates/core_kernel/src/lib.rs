//! Core Kernel - Foundational types shared by every crate of the claim bot
//!
//! This crate provides the building blocks used across the workspace:
//! - Strongly-typed identifiers for chat users and messages
//! - Port infrastructure (error type, marker and health traits)
//! - Messaging ports for the chat transport, operator notifier and timer

pub mod identifiers;
pub mod error;
pub mod ports;
pub mod messaging;

pub use identifiers::{UserId, MessageId};
pub use error::CoreError;
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
    Transport, Notifier, Clock, TokioClock,
};
pub use messaging::{InboundEvent, ChoiceButton, ChoiceButtons, MessageRef};
