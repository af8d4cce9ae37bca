//! Telegram Bot API adapter
//!
//! - [`TelegramClient`]: JSON client implementing the `Transport` and
//!   `Notifier` ports
//! - [`TelegramPoller`]: long-polling loop turning updates into events
//! - [`types`]: the subset of the wire format the bot uses

pub mod client;
pub mod poller;
pub mod types;

pub use client::TelegramClient;
pub use poller::{PollError, TelegramPoller};
