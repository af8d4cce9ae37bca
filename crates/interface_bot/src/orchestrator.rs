//! Conversation orchestrator
//!
//! Binds inbound chat events to the intake flow. For each event the
//! orchestrator locks the sender's slot, runs the matching `ClaimFlow`
//! transition and renders the outcome through the `Transport` port.
//!
//! Rendering failures are logged and never undo a stored claim.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use core_kernel::{ChoiceButtons, Clock, InboundEvent, Notifier, Transport, UserId};
use domain_claims::{ClaimError, ClaimFlow, FlowOutcome, FlowSession, FlowState};

use crate::messages;
use crate::progress::{self, ProgressContext, ProgressReport};
use crate::session::{SessionStore, UserSlot};

/// Orchestrator settings taken from the bot configuration
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorSettings {
    /// The only user allowed to run `/admin`, and the notification target
    pub operator: UserId,
    /// Delay between verification steps
    pub progress_delay: Duration,
}

/// Routes events of every user to their conversation
pub struct Orchestrator {
    flow: ClaimFlow,
    sessions: Arc<SessionStore>,
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    pub fn new(
        flow: ClaimFlow,
        sessions: Arc<SessionStore>,
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            flow,
            sessions,
            transport,
            notifier,
            clock,
            settings,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Handles one event to completion
    ///
    /// Two events of the same user never run this concurrently past the
    /// slot lock.
    #[instrument(skip(self, event), fields(user_id = %event.user_id(), kind = event.kind()))]
    pub async fn handle(&self, event: InboundEvent) {
        let user = event.user_id();
        let slot = self.sessions.slot(user).await;
        let mut slot = slot.lock().await;

        match event {
            InboundEvent::Command { command, .. } => {
                self.on_command(&mut slot, user, &command).await
            }
            InboundEvent::ButtonPressed { data, .. } => self.on_button(&mut slot, user, &data).await,
            InboundEvent::TextReceived { text, .. } => self.on_text(&mut slot, user, &text).await,
        }
        slot.release_if_closed();
    }

    /// Waits for the user's verification sequence, if one was started
    pub async fn finish_progress(&self, user: UserId) -> Option<ProgressReport> {
        let handle = self.sessions.slot(user).await.lock().await.take_progress()?;
        handle.join().await
    }

    /// Waits for every running verification sequence
    pub async fn drain_progress(&self) {
        for slot in self.sessions.all_slots().await {
            let handle = slot.lock().await.take_progress();
            if let Some(handle) = handle {
                handle.join().await;
            }
        }
    }

    async fn on_command(&self, slot: &mut UserSlot, user: UserId, command: &str) {
        match command {
            "start" => self.on_start(slot, user).await,
            "cancel" => self.on_cancel(slot, user).await,
            "admin" => self.on_admin(user).await,
            other => debug!(command = other, "ignoring unknown command"),
        }
    }

    async fn on_start(&self, slot: &mut UserSlot, user: UserId) {
        match self.flow.has_claim(user).await {
            Ok(true) => self.send(user, messages::ALREADY_PENDING, None).await,
            Ok(false) => match slot.session() {
                Some(session) => self.prompt(session).await,
                None => {
                    self.send(user, messages::WELCOME, Some(&messages::welcome_buttons()))
                        .await
                }
            },
            Err(e) => self.store_failure(user, e).await,
        }
    }

    async fn on_cancel(&self, slot: &mut UserSlot, user: UserId) {
        if let Some(handle) = slot.running_progress() {
            handle.cancel();
            debug!("verification sequence cancel requested");
        }

        let Some(session) = slot.session_mut() else {
            debug!("cancel without an open conversation");
            return;
        };
        match self.flow.cancel(session) {
            Ok(_) => {
                info!(state = %FlowState::Cancelled, "conversation cancelled");
                self.send(user, messages::CANCELLED, None).await;
            }
            Err(e) => warn!(error = %e, "cancel rejected"),
        }
    }

    async fn on_admin(&self, user: UserId) {
        if user != self.settings.operator {
            debug!("admin command from a non-operator");
            return;
        }
        match self.flow.total_claims().await {
            Ok(total) => self.send(user, &messages::admin_total(total), None).await,
            Err(e) => self.store_failure(user, e).await,
        }
    }

    async fn on_button(&self, slot: &mut UserSlot, user: UserId, data: &str) {
        if data == messages::CLAIM_BUTTON_DATA {
            return self.on_claim_intent(slot, user).await;
        }

        let Some(session) = slot.session_mut() else {
            debug!(data, "button without an open conversation");
            return;
        };
        if session.state() != FlowState::AwaitingNetwork {
            return self.prompt(session).await;
        }

        match self.flow.choose_network(session, data) {
            Ok(FlowOutcome::AwaitingWallet(network)) => {
                debug!(network = %network, "network chosen");
                self.send(user, &messages::ask_wallet(network), None).await;
            }
            Ok(other) => warn!(outcome = ?other, "unexpected outcome for network choice"),
            Err(e) => {
                warn!(error = %e, "rejected network choice");
                self.prompt(session).await;
            }
        }
    }

    async fn on_claim_intent(&self, slot: &mut UserSlot, user: UserId) {
        if let Some(session) = slot.session() {
            return self.prompt(session).await;
        }

        let mut session = FlowSession::new(user);
        match self.flow.start(&mut session).await {
            Ok(FlowOutcome::AwaitingHandle) => {
                info!("conversation started");
                self.send(user, messages::ASK_HANDLE, None).await;
            }
            Ok(FlowOutcome::AlreadyPending) => {
                self.send(user, messages::ALREADY_PENDING, None).await;
            }
            Ok(other) => warn!(outcome = ?other, "unexpected outcome for claim intent"),
            Err(e) => self.store_failure(user, e).await,
        }
        slot.store_session(session);
    }

    async fn on_text(&self, slot: &mut UserSlot, user: UserId, text: &str) {
        let Some(session) = slot.session_mut() else {
            debug!("text without an open conversation");
            return;
        };

        match session.state() {
            FlowState::AwaitingHandle => match self.flow.submit_handle(session, text) {
                Ok(_) => {
                    let buttons = messages::network_buttons();
                    self.send(user, messages::ASK_NETWORK, Some(&buttons)).await;
                }
                Err(e) => {
                    warn!(error = %e, "rejected handle");
                    self.prompt(session).await;
                }
            },
            FlowState::AwaitingWallet => match self.flow.submit_wallet(session, text).await {
                Ok(FlowOutcome::Submitted { record, persisted }) => {
                    let ctx = self.progress_context();
                    slot.set_progress(progress::spawn(ctx, record, persisted));
                }
                Ok(other) => warn!(outcome = ?other, "unexpected outcome for wallet"),
                Err(e) if e.is_user_input() => {
                    warn!(error = %e, "rejected wallet");
                    self.prompt(session).await;
                }
                Err(e) => self.store_failure(user, e).await,
            },
            _ => self.prompt(session).await,
        }
    }

    /// Repeats the question of the session's current step
    async fn prompt(&self, session: &FlowSession) {
        let user = session.user_id();
        match session.state() {
            FlowState::AwaitingHandle => self.send(user, messages::ASK_HANDLE, None).await,
            FlowState::AwaitingNetwork => {
                let buttons = messages::network_buttons();
                self.send(user, messages::ASK_NETWORK, Some(&buttons)).await
            }
            FlowState::AwaitingWallet => match session.network() {
                Some(network) => self.send(user, &messages::ask_wallet(network), None).await,
                None => warn!("wallet step without a network"),
            },
            state => debug!(state = %state, "nothing to prompt"),
        }
    }

    async fn store_failure(&self, user: UserId, e: ClaimError) {
        error!(error = %e, "claim store failure");
        self.send(user, messages::TEMPORARY_ERROR, None).await;
    }

    async fn send(&self, to: UserId, text: &str, buttons: Option<&ChoiceButtons>) {
        if let Err(e) = self.transport.send_text(to, text, buttons).await {
            warn!(user_id = %to, error = %e, "failed to deliver message");
        }
    }

    fn progress_context(&self) -> ProgressContext {
        ProgressContext {
            transport: self.transport.clone(),
            notifier: self.notifier.clone(),
            clock: self.clock.clone(),
            operator: self.settings.operator,
            delay: self.settings.progress_delay,
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
