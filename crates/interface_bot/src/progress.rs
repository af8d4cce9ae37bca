//! Verification animation and operator notification
//!
//! After a claim is filed the user sees a short, purely cosmetic
//! "verification" sequence: one message edited through four steps with a
//! fixed delay between them, followed by the confirmation text. The operator
//! is notified once the sequence ends.
//!
//! The sequence runs as its own task so the user's slot is not locked while
//! it waits. It can be cut short through its [`ProgressHandle`]; the claim
//! is already stored at that point, so the operator is still notified.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use core_kernel::{Clock, MessageRef, Notifier, Transport, UserId};
use domain_claims::ClaimRecord;

use crate::messages;

/// How a verification sequence ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressReport {
    /// Every step ran and the confirmation was sent
    Finished,
    /// Cancelled after the given number of edits
    Aborted { steps_shown: usize },
}

/// Collaborators the sequence talks to
#[derive(Clone)]
pub struct ProgressContext {
    pub transport: Arc<dyn Transport>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
    pub operator: UserId,
    pub delay: Duration,
}

impl std::fmt::Debug for ProgressContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressContext")
            .field("operator", &self.operator)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// Handle on a running sequence
#[derive(Debug)]
pub struct ProgressHandle {
    cancel: watch::Sender<bool>,
    task: JoinHandle<ProgressReport>,
}

impl ProgressHandle {
    /// Asks the sequence to stop before its next edit
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the sequence to end. `None` if the task panicked.
    pub async fn join(self) -> Option<ProgressReport> {
        match self.task.await {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(error = %e, "progress task failed");
                None
            }
        }
    }
}

/// Starts the sequence for a claim that was just filed
///
/// `persisted` is false when a concurrent flow stored the user's claim
/// first; the animation still runs but the operator is not notified twice.
pub fn spawn(ctx: ProgressContext, record: ClaimRecord, persisted: bool) -> ProgressHandle {
    let (cancel, cancelled) = watch::channel(false);
    let task = tokio::spawn(run(ctx, record, persisted, cancelled));
    ProgressHandle { cancel, task }
}

async fn run(
    ctx: ProgressContext,
    record: ClaimRecord,
    persisted: bool,
    mut cancelled: watch::Receiver<bool>,
) -> ProgressReport {
    let user = record.user_id;
    let message: Option<MessageRef> =
        match ctx.transport.send_text(user, messages::PROGRESS_START, None).await {
            Ok(message) => Some(message),
            Err(e) => {
                warn!(user_id = %user, error = %e, "failed to send verification message");
                None
            }
        };

    let mut report = ProgressReport::Finished;
    for (shown, step) in messages::PROGRESS_STEPS.iter().enumerate() {
        let stop = tokio::select! {
            biased;
            true = stop_requested(&mut cancelled) => true,
            _ = ctx.clock.sleep(ctx.delay) => false,
        };
        if stop {
            report = ProgressReport::Aborted { steps_shown: shown };
            break;
        }
        if let Some(message) = &message {
            if let Err(e) = ctx.transport.edit_text(message, step).await {
                warn!(user_id = %user, error = %e, "failed to edit verification message");
            }
        }
    }

    match report {
        ProgressReport::Finished => {
            if let Err(e) = ctx.transport.send_text(user, messages::SUBMITTED, None).await {
                warn!(user_id = %user, error = %e, "failed to send confirmation");
            }
        }
        ProgressReport::Aborted { steps_shown } => {
            debug!(user_id = %user, steps_shown, "verification sequence cancelled");
        }
    }

    if persisted {
        match ctx.notifier.notify(ctx.operator, &messages::new_claim_notice(&record)).await {
            Ok(()) => info!(user_id = %user, network = %record.network, "operator notified"),
            Err(e) => warn!(user_id = %user, error = %e, "failed to notify operator"),
        }
    } else {
        warn!(user_id = %user, "claim was filed by a concurrent flow, skipping operator notification");
    }

    report
}

/// Resolves to true once cancellation is requested, false if the handle is gone
async fn stop_requested(cancelled: &mut watch::Receiver<bool>) -> bool {
    cancelled.wait_for(|stop| *stop).await.is_ok()
}
