//! Per-user conversation state
//!
//! `SessionStore` maps each user to a slot behind its own async mutex.
//! Holding a slot's lock is what serializes the transitions of one user;
//! different users never contend beyond the short map lookup.
//!
//! Slots are kept for the lifetime of the process.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use core_kernel::UserId;
use domain_claims::{FlowSession, FlowState};

use crate::progress::ProgressHandle;

/// Everything the bot remembers about one user between events
#[derive(Debug, Default)]
pub struct UserSlot {
    session: Option<FlowSession>,
    progress: Option<ProgressHandle>,
}

impl UserSlot {
    /// The open conversation, if any
    pub fn session(&self) -> Option<&FlowSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut FlowSession> {
        self.session.as_mut()
    }

    /// Keeps a session only while one of its questions is pending
    pub fn store_session(&mut self, session: FlowSession) {
        let pending = session.is_open() && session.state() != FlowState::Idle;
        self.session = pending.then_some(session);
    }

    /// Drops the session once it reached a terminal state
    pub fn release_if_closed(&mut self) {
        if self.session.as_ref().is_some_and(|s| !s.is_open()) {
            self.session = None;
        }
    }

    /// The verification sequence still running for this user
    pub fn running_progress(&self) -> Option<&ProgressHandle> {
        self.progress.as_ref().filter(|p| !p.is_finished())
    }

    pub fn set_progress(&mut self, handle: ProgressHandle) {
        self.progress = Some(handle);
    }

    pub fn take_progress(&mut self) -> Option<ProgressHandle> {
        self.progress.take()
    }
}

/// Owned map of user slots, injected into the orchestrator
#[derive(Debug, Default)]
pub struct SessionStore {
    slots: RwLock<HashMap<UserId, Arc<Mutex<UserSlot>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot of a user, creating an empty one on first contact
    pub async fn slot(&self, user_id: UserId) -> Arc<Mutex<UserSlot>> {
        if let Some(slot) = self.slots.read().await.get(&user_id) {
            return slot.clone();
        }
        self.slots
            .write()
            .await
            .entry(user_id)
            .or_default()
            .clone()
    }

    /// Snapshot of every known slot
    pub async fn all_slots(&self) -> Vec<Arc<Mutex<UserSlot>>> {
        self.slots.read().await.values().cloned().collect()
    }

    /// Number of users with an open conversation
    pub async fn open_sessions(&self) -> usize {
        let mut open = 0;
        for slot in self.all_slots().await {
            if slot.lock().await.session().is_some() {
                open += 1;
            }
        }
        open
    }
}
