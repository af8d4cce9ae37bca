//! Chat Interface Layer
//!
//! This crate runs the claim intake conversation over the Telegram Bot API.
//!
//! # Architecture
//!
//! - **Telegram**: long-polling update source and the `Transport`/`Notifier`
//!   adapter
//! - **Dispatcher**: per-user queues keeping each user's events in order
//! - **Orchestrator**: maps events to intake flow transitions and replies
//! - **Progress**: the timed verification sequence and operator notification
//! - **Health**: optional liveness/readiness endpoint
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_bot::{Dispatcher, Orchestrator};
//!
//! let orchestrator = Arc::new(Orchestrator::new(flow, sessions, transport, notifier, clock, settings));
//! tokio::spawn(Dispatcher::new(orchestrator).run(events_rx, shutdown_rx));
//! ```

pub mod config;
pub mod error;
pub mod messages;
pub mod session;
pub mod progress;
pub mod orchestrator;
pub mod dispatcher;
pub mod telegram;
pub mod health;

pub use config::{BotConfig, ConfigError};
pub use error::BotError;
pub use session::SessionStore;
pub use orchestrator::{Orchestrator, OrchestratorSettings};
pub use dispatcher::Dispatcher;
pub use progress::ProgressReport;
