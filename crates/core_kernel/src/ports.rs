//! Ports and Adapters Infrastructure
//!
//! This module provides the foundational types for the hexagonal architecture
//! used across the workspace, together with the messaging ports the
//! conversation layer talks to.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Orchestrator (interface_bot)               │
//! └─────────────────────────────────────────────────────────────┘
//!          │                  │                   │
//!          ▼                  ▼                   ▼
//! ┌────────────────┐ ┌────────────────┐ ┌────────────────────┐
//! │   ClaimStore   │ │   Transport    │ │ Notifier / Clock   │
//! │ (domain_claims)│ │ (core_kernel)  │ │   (core_kernel)    │
//! └────────────────┘ └────────────────┘ └────────────────────┘
//!          ▲                  ▲                   ▲
//!   SQLite adapter     Telegram adapter     Telegram / tokio
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! #[async_trait]
//! impl Transport for TelegramClient {
//!     async fn send_text(&self, to: UserId, text: &str, buttons: Option<&ChoiceButtons>)
//!         -> Result<MessageRef, PortError> { ... }
//!     async fn edit_text(&self, message: &MessageRef, text: &str) -> Result<(), PortError> { ... }
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identifiers::UserId;
use crate::messaging::{ChoiceButtons, MessageRef};

/// Error type for port operations
///
/// Provides a unified error type that all port implementations must use,
/// ensuring consistent error handling across storage and chat adapters.
#[derive(Debug, Error)]
pub enum PortError {
    /// A validation error occurred
    #[error("Validation error: {message}")]
    Validation {
        message: String,
    },

    /// The operation conflicts with existing data
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
    },

    /// Connection to the underlying system failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation timed out
    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout {
        operation: String,
        duration_ms: u64,
    },

    /// Authentication or authorization failed
    #[error("Unauthorized: {message}")]
    Unauthorized {
        message: String,
    },

    /// Rate limit exceeded for external API
    #[error("Rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        retry_after_secs: u64,
    },

    /// The external system is unavailable
    #[error("Service unavailable: {service}")]
    ServiceUnavailable {
        service: String,
    },

    /// A data transformation error occurred
    #[error("Transformation error: {message}")]
    Transformation {
        message: String,
    },

    /// An internal error occurred
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a Transformation error
    pub fn transformation(message: impl Into<String>) -> Self {
        PortError::Transformation {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this error indicates a transient failure that may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortError::Connection { .. }
                | PortError::Timeout { .. }
                | PortError::RateLimited { .. }
                | PortError::ServiceUnavailable { .. }
        )
    }

    /// Returns true if the operation collided with an existing record
    pub fn is_conflict(&self) -> bool {
        matches!(self, PortError::Conflict { .. })
    }
}

/// Marker trait for all domain ports
///
/// All port traits should extend this marker to ensure they are
/// thread-safe and can be used in async contexts.
pub trait DomainPort: Send + Sync + 'static {}

/// Health status for an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    /// Adapter is healthy and operational
    Healthy,
    /// Adapter is degraded but operational
    Degraded,
    /// Adapter is unhealthy and not operational
    Unhealthy,
}

/// Health check result for an adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// Adapter identifier
    pub adapter_id: String,
    /// Current health status
    pub status: AdapterHealth,
    /// Latency of the health check in milliseconds
    pub latency_ms: u64,
    /// Optional message with additional details
    pub message: Option<String>,
    /// Timestamp of the health check
    pub checked_at: DateTime<Utc>,
}

impl HealthCheckResult {
    /// Returns true unless the adapter reported itself unhealthy
    pub fn is_serving(&self) -> bool {
        self.status != AdapterHealth::Unhealthy
    }
}

/// Trait for adapters that support health checks
#[async_trait]
pub trait HealthCheckable: Send + Sync {
    /// Performs a health check on the adapter
    async fn health_check(&self) -> HealthCheckResult;
}

/// Outbound side of the chat transport
///
/// Inbound events do not go through this trait: transports push
/// [`InboundEvent`](crate::InboundEvent)s into the dispatcher channel.
#[async_trait]
pub trait Transport: DomainPort {
    /// Sends a text message to a user, optionally with inline choice buttons
    ///
    /// # Returns
    ///
    /// A reference to the sent message, usable with [`Transport::edit_text`]
    async fn send_text(
        &self,
        to: UserId,
        text: &str,
        buttons: Option<&ChoiceButtons>,
    ) -> Result<MessageRef, PortError>;

    /// Replaces the text of a message previously sent by the bot
    async fn edit_text(&self, message: &MessageRef, text: &str) -> Result<(), PortError>;
}

/// Delivery of notices to the operator
#[async_trait]
pub trait Notifier: DomainPort {
    /// Sends `text` to the operator. Callers treat failures as best-effort.
    async fn notify(&self, operator: UserId, text: &str) -> Result<(), PortError>;
}

/// Suspension primitive used by timed sequences
#[async_trait]
pub trait Clock: DomainPort {
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl DomainPort for TokioClock {}

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_conflict() {
        let error = PortError::conflict("claim for USR-1 already exists");
        assert!(error.is_conflict());
        assert!(!error.is_transient());
        assert!(error.to_string().contains("USR-1"));
    }

    #[test]
    fn test_port_error_transient() {
        let timeout = PortError::Timeout {
            operation: "getUpdates".to_string(),
            duration_ms: 5000,
        };
        assert!(timeout.is_transient());

        let rate_limited = PortError::RateLimited {
            retry_after_secs: 60,
        };
        assert!(rate_limited.is_transient());

        let validation = PortError::validation("chat not found");
        assert!(!validation.is_transient());
        assert!(!validation.is_conflict());
    }

    #[test]
    fn test_health_result_serving() {
        let mut result = HealthCheckResult {
            adapter_id: "test".to_string(),
            status: AdapterHealth::Degraded,
            latency_ms: 3,
            message: None,
            checked_at: Utc::now(),
        };
        assert!(result.is_serving());
        result.status = AdapterHealth::Unhealthy;
        assert!(!result.is_serving());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_sleeps() {
        let start = tokio::time::Instant::now();
        TokioClock.sleep(Duration::from_millis(1200)).await;
        assert!(start.elapsed() >= Duration::from_millis(1200));
    }
}
