//! Per-user event dispatch
//!
//! Events arrive on one channel in platform order. The dispatcher hands each
//! user their own queue and worker task, so one user's events are handled
//! strictly in arrival order while other users proceed concurrently.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use core_kernel::{InboundEvent, UserId};

use crate::orchestrator::Orchestrator;

/// Fans inbound events out to per-user workers
#[derive(Debug)]
pub struct Dispatcher {
    orchestrator: Arc<Orchestrator>,
    queues: HashMap<UserId, mpsc::UnboundedSender<InboundEvent>>,
    workers: JoinSet<()>,
}

impl Dispatcher {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator,
            queues: HashMap::new(),
            workers: JoinSet::new(),
        }
    }

    /// Dispatches until the inbound channel closes or shutdown is signalled,
    /// then lets every worker finish its queue
    pub async fn run(
        mut self,
        mut inbound: mpsc::Receiver<InboundEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!("dispatcher started");
        loop {
            tokio::select! {
                event = inbound.recv() => match event {
                    Some(event) => self.route(event),
                    None => break,
                },
                _ = shutdown_requested(&mut shutdown) => break,
            }
            self.reap();
        }

        self.queues.clear();
        while self.workers.join_next().await.is_some() {}
        info!("dispatcher stopped");
    }

    fn route(&mut self, event: InboundEvent) {
        let user = event.user_id();
        let event = match self.queues.get(&user) {
            Some(queue) => match queue.send(event) {
                Ok(()) => return,
                Err(mpsc::error::SendError(event)) => event,
            },
            None => event,
        };

        let (queue, mut rx) = mpsc::unbounded_channel();
        let orchestrator = self.orchestrator.clone();
        self.workers.spawn(async move {
            while let Some(event) = rx.recv().await {
                orchestrator.handle(event).await;
            }
        });
        debug!(user_id = %user, "worker spawned");

        if queue.send(event).is_ok() {
            self.queues.insert(user, queue);
        }
    }

    /// Collects workers that ended so their results do not pile up
    fn reap(&mut self) {
        while let Some(result) = self.workers.try_join_next() {
            if let Err(e) = result {
                warn!(error = %e, "worker ended abnormally");
            }
        }
    }
}

/// Resolves once shutdown is signalled or the signal sender is gone
pub(crate) async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}
