//! Claim intake service
//!
//! `ClaimFlow` drives a [`FlowSession`] through the steps that need the
//! claim store: the duplicate guard on entry and the insert on wallet
//! submission. The remaining steps delegate to the session directly.

use std::sync::Arc;

use tracing::{info, warn};

use core_kernel::UserId;
use crate::claim::{ClaimRecord, Network};
use crate::error::ClaimError;
use crate::flow::{ClaimIntent, FlowSession, FlowState};
use crate::ports::ClaimStore;

/// What the conversation layer should render after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    /// Ask for the handle
    AwaitingHandle,
    /// A claim is already on file; the session is over
    AlreadyPending,
    /// Ask for the network
    AwaitingNetwork,
    /// Ask for a wallet on the chosen network
    AwaitingWallet(Network),
    /// The wallet step finished. `persisted` is false when a concurrent
    /// flow for the same user won the insert; the stored record is theirs.
    Submitted { record: ClaimRecord, persisted: bool },
    /// The session was abandoned
    Cancelled,
}

/// Service running the store-backed transitions of the intake flow
#[derive(Clone)]
pub struct ClaimFlow {
    store: Arc<dyn ClaimStore>,
}

impl ClaimFlow {
    /// Creates a new flow service over the given store
    pub fn new(store: Arc<dyn ClaimStore>) -> Self {
        Self { store }
    }

    /// Returns the underlying store
    pub fn store(&self) -> &Arc<dyn ClaimStore> {
        &self.store
    }

    /// Returns true if the user already filed a claim
    pub async fn has_claim(&self, user_id: UserId) -> Result<bool, ClaimError> {
        Ok(self.store.exists(user_id).await?)
    }

    /// Total number of claims on file
    pub async fn total_claims(&self) -> Result<u64, ClaimError> {
        Ok(self.store.count().await?)
    }

    /// Handles the claim-intent event on an idle session
    ///
    /// The existence check is a fast path for the user; the store's own
    /// uniqueness check on insert is what prevents a second record.
    pub async fn start(&self, session: &mut FlowSession) -> Result<FlowOutcome, ClaimError> {
        if session.state() != FlowState::Idle {
            return Err(ClaimError::InvalidTransition {
                from: session.state(),
                input: "claim intent",
            });
        }

        let already_claimed = self.store.exists(session.user_id()).await?;
        match session.claim_intent(already_claimed)? {
            ClaimIntent::Started => Ok(FlowOutcome::AwaitingHandle),
            ClaimIntent::AlreadyPending => Ok(FlowOutcome::AlreadyPending),
        }
    }

    /// Handles a text message while the handle is expected
    pub fn submit_handle(
        &self,
        session: &mut FlowSession,
        text: &str,
    ) -> Result<FlowOutcome, ClaimError> {
        session.submit_handle(text)?;
        Ok(FlowOutcome::AwaitingNetwork)
    }

    /// Handles a network button while the network is expected
    pub fn choose_network(
        &self,
        session: &mut FlowSession,
        choice: &str,
    ) -> Result<FlowOutcome, ClaimError> {
        let network = session.choose_network(choice)?;
        Ok(FlowOutcome::AwaitingWallet(network))
    }

    /// Handles the wallet address and files the claim
    ///
    /// # Errors
    ///
    /// Store failures other than a duplicate leave the session waiting for
    /// the wallet so the user can send it again. Nothing is retried here.
    pub async fn submit_wallet(
        &self,
        session: &mut FlowSession,
        wallet_address: &str,
    ) -> Result<FlowOutcome, ClaimError> {
        let record = session.build_claim(wallet_address)?;

        let persisted = match self.store.insert(&record).await {
            Ok(()) => true,
            Err(e) if e.is_conflict() => {
                warn!(
                    user_id = %record.user_id,
                    error = %ClaimError::DuplicateKey(record.user_id),
                    "claim already on file, keeping the stored record"
                );
                false
            }
            Err(e) => return Err(ClaimError::Store(e)),
        };

        session.complete()?;
        if persisted {
            info!(user_id = %record.user_id, network = %record.network, "claim filed");
        }
        Ok(FlowOutcome::Submitted { record, persisted })
    }

    /// Handles the cancel command
    pub fn cancel(&self, session: &mut FlowSession) -> Result<FlowOutcome, ClaimError> {
        session.cancel()?;
        Ok(FlowOutcome::Cancelled)
    }
}

impl std::fmt::Debug for ClaimFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimFlow").finish_non_exhaustive()
    }
}
