//! Intake conversation state machine
//!
//! A [`FlowSession`] holds one user's answers while they walk through the
//! prompts. Every method here is a row of the transition table below; a
//! rejected input returns an error and leaves the session untouched.
//!
//! | From            | Trigger        | Guard               | To               |
//! |-----------------|----------------|---------------------|------------------|
//! | Idle            | claim intent   | no claim on file    | AwaitingHandle   |
//! | Idle            | claim intent   | claim on file       | Completed        |
//! | AwaitingHandle  | text           | not blank           | AwaitingNetwork  |
//! | AwaitingNetwork | network choice | SOL, ETH or BTC     | AwaitingWallet   |
//! | AwaitingWallet  | text           | not blank, stored   | Completed        |
//! | non-terminal    | cancel         |                     | Cancelled        |

use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::UserId;
use crate::claim::{ClaimRecord, Network};
use crate::error::ClaimError;

/// Position of a session in the intake conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowState {
    /// No conversation started
    Idle,
    /// Waiting for the user's handle
    AwaitingHandle,
    /// Waiting for a network button
    AwaitingNetwork,
    /// Waiting for the wallet address
    AwaitingWallet,
    /// Claim filed, or one was already on file
    Completed,
    /// Abandoned through the cancel command
    Cancelled,
}

impl FlowState {
    /// Returns true once the conversation is over
    pub fn is_terminal(&self) -> bool {
        matches!(self, FlowState::Completed | FlowState::Cancelled)
    }

    /// Checks if transition is valid
    pub fn can_transition_to(&self, target: FlowState) -> bool {
        use FlowState::*;
        matches!(
            (*self, target),
            (Idle, AwaitingHandle) |
            (Idle, Completed) |
            (AwaitingHandle, AwaitingNetwork) |
            (AwaitingNetwork, AwaitingWallet) |
            (AwaitingWallet, Completed) |
            (Idle | AwaitingHandle | AwaitingNetwork | AwaitingWallet, Cancelled)
        )
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowState::Idle => "idle",
            FlowState::AwaitingHandle => "awaiting handle",
            FlowState::AwaitingNetwork => "awaiting network",
            FlowState::AwaitingWallet => "awaiting wallet",
            FlowState::Completed => "completed",
            FlowState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Result of a claim-intent event on an idle session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimIntent {
    /// The handle prompt should be shown
    Started,
    /// The user already filed a claim; the session ends without a record
    AlreadyPending,
}

/// One user's in-progress answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSession {
    user_id: UserId,
    state: FlowState,
    handle: Option<String>,
    network: Option<Network>,
}

impl FlowSession {
    /// Creates an idle session
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            state: FlowState::Idle,
            handle: None,
            network: None,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn handle(&self) -> Option<&str> {
        self.handle.as_deref()
    }

    pub fn network(&self) -> Option<Network> {
        self.network
    }

    /// Returns true while the conversation can still take input
    pub fn is_open(&self) -> bool {
        !self.state.is_terminal()
    }

    /// Handles the claim-intent event. `already_claimed` is the store's
    /// answer for this user.
    pub fn claim_intent(&mut self, already_claimed: bool) -> Result<ClaimIntent, ClaimError> {
        self.expect(FlowState::Idle, "claim intent")?;
        if already_claimed {
            self.advance(FlowState::Completed)?;
            Ok(ClaimIntent::AlreadyPending)
        } else {
            self.advance(FlowState::AwaitingHandle)?;
            Ok(ClaimIntent::Started)
        }
    }

    /// Stores the handle typed by the user
    pub fn submit_handle(&mut self, text: &str) -> Result<(), ClaimError> {
        self.expect(FlowState::AwaitingHandle, "handle")?;
        if text.trim().is_empty() {
            return Err(ClaimError::EmptyInput);
        }
        self.advance(FlowState::AwaitingNetwork)?;
        self.handle = Some(text.to_string());
        Ok(())
    }

    /// Stores the network chosen from the keyboard
    pub fn choose_network(&mut self, choice: &str) -> Result<Network, ClaimError> {
        self.expect(FlowState::AwaitingNetwork, "network choice")?;
        let network: Network = choice.parse()?;
        self.advance(FlowState::AwaitingWallet)?;
        self.network = Some(network);
        Ok(network)
    }

    /// Builds the record the wallet submission would file, without moving
    /// the session. The caller persists it and then calls [`Self::complete`].
    pub fn build_claim(&self, wallet_address: &str) -> Result<ClaimRecord, ClaimError> {
        self.expect(FlowState::AwaitingWallet, "wallet address")?;
        if wallet_address.trim().is_empty() {
            return Err(ClaimError::EmptyInput);
        }
        let handle = self.handle.as_deref().ok_or(ClaimError::IncompleteSession("handle"))?;
        let network = self.network.ok_or(ClaimError::IncompleteSession("network"))?;
        Ok(ClaimRecord::pending(self.user_id, handle, network, wallet_address))
    }

    /// Marks the wallet step done once its record has been handed to the store
    pub fn complete(&mut self) -> Result<(), ClaimError> {
        self.expect(FlowState::AwaitingWallet, "completion")?;
        self.advance(FlowState::Completed)
    }

    /// Abandons the conversation, dropping any collected answers
    pub fn cancel(&mut self) -> Result<(), ClaimError> {
        self.advance(FlowState::Cancelled)?;
        self.handle = None;
        self.network = None;
        Ok(())
    }

    fn expect(&self, expected: FlowState, input: &'static str) -> Result<(), ClaimError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ClaimError::InvalidTransition {
                from: self.state,
                input,
            })
        }
    }

    fn advance(&mut self, target: FlowState) -> Result<(), ClaimError> {
        if !self.state.can_transition_to(target) {
            return Err(ClaimError::InvalidTransition {
                from: self.state,
                input: "transition",
            });
        }
        tracing::debug!(user_id = %self.user_id, from = %self.state, to = %target, "flow transition");
        self.state = target;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> FlowSession {
        FlowSession::new(UserId::new(1))
    }

    #[test]
    fn test_new_session_is_idle() {
        let s = session();
        assert_eq!(s.state(), FlowState::Idle);
        assert!(s.is_open());
        assert!(s.handle().is_none());
    }

    #[test]
    fn test_cancel_from_terminal_is_rejected() {
        let mut s = session();
        s.cancel().unwrap();
        assert!(s.cancel().is_err());
        assert_eq!(s.state(), FlowState::Cancelled);
    }

    #[test]
    fn test_handle_is_kept_verbatim() {
        let mut s = session();
        s.claim_intent(false).unwrap();
        s.submit_handle(" player1 ").unwrap();
        assert_eq!(s.handle(), Some(" player1 "));
    }

    #[test]
    fn test_transition_table_rejects_skips() {
        assert!(!FlowState::Idle.can_transition_to(FlowState::AwaitingNetwork));
        assert!(!FlowState::AwaitingHandle.can_transition_to(FlowState::Completed));
        assert!(!FlowState::Completed.can_transition_to(FlowState::Cancelled));
        assert!(!FlowState::Cancelled.can_transition_to(FlowState::Idle));
    }
}
