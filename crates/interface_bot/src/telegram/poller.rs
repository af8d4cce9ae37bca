//! Long-polling update source
//!
//! Fetches updates with `getUpdates`, advances the offset past every update
//! it has seen, acknowledges button presses and forwards the resulting
//! events to the dispatcher channel.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use core_kernel::{InboundEvent, PortError};

use super::client::TelegramClient;
use crate::dispatcher::shutdown_requested;

const DEFAULT_BACKOFF: Duration = Duration::from_secs(3);

/// Why a poll round could not deliver its events
#[derive(Debug)]
pub enum PollError {
    /// `getUpdates` failed
    Fetch(PortError),
    /// The dispatcher is gone
    Closed,
}

/// Update source feeding the dispatcher
#[derive(Debug)]
pub struct TelegramPoller {
    client: Arc<TelegramClient>,
    timeout: Duration,
    backoff: Duration,
    offset: Option<i64>,
}

impl TelegramPoller {
    pub fn new(client: Arc<TelegramClient>, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            backoff: DEFAULT_BACKOFF,
            offset: None,
        }
    }

    /// Sets the pause after a failed poll
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Offset the next poll will request
    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    /// Polls until shutdown is signalled or the dispatcher goes away
    pub async fn run(mut self, events: mpsc::Sender<InboundEvent>, mut shutdown: watch::Receiver<bool>) {
        info!("polling for updates");
        loop {
            let round = tokio::select! {
                _ = shutdown_requested(&mut shutdown) => break,
                round = self.poll_once(&events) => round,
            };

            match round {
                Ok(count) => debug!(count, "poll round delivered events"),
                Err(PollError::Closed) => break,
                Err(PollError::Fetch(e)) => {
                    warn!(error = %e, backoff_ms = self.backoff.as_millis() as u64, "getUpdates failed");
                    tokio::select! {
                        _ = shutdown_requested(&mut shutdown) => break,
                        _ = tokio::time::sleep(self.backoff) => {}
                    }
                }
            }
        }
        info!("polling stopped");
    }

    /// Runs one `getUpdates` round and returns the number of events forwarded
    pub async fn poll_once(&mut self, events: &mpsc::Sender<InboundEvent>) -> Result<usize, PollError> {
        let updates = self
            .client
            .get_updates(self.offset, self.timeout)
            .await
            .map_err(PollError::Fetch)?;

        let mut forwarded = 0;
        for update in updates {
            self.offset = Some(update.update_id + 1);

            if let Some(id) = update.callback_query_id() {
                if let Err(e) = self.client.answer_callback_query(id).await {
                    warn!(error = %e, "failed to acknowledge button press");
                }
            }

            match update.to_event() {
                Some(event) => {
                    events.send(event).await.map_err(|_| PollError::Closed)?;
                    forwarded += 1;
                }
                None => debug!(update_id = update.update_id, "skipping update"),
            }
        }
        Ok(forwarded)
    }
}
