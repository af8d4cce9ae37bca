//! Bot error handling
//!
//! Errors that can stop the bot during bootstrap. Conversation-time failures
//! never surface here: the orchestrator answers the user and logs them.

use thiserror::Error;

use core_kernel::PortError;
use infra_db::DatabaseError;

use crate::config::ConfigError;

/// Bootstrap error types
#[derive(Debug, Error)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Chat platform error: {0}")]
    Port(#[from] PortError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BotError {
    /// Short label for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            BotError::Config(_) => "config",
            BotError::Database(_) => "database",
            BotError::Port(_) => "port",
            BotError::Io(_) => "io",
        }
    }
}
