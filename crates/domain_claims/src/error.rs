//! Claims domain errors

use thiserror::Error;

use core_kernel::{PortError, UserId};
use crate::flow::FlowState;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("A claim already exists for {0}")]
    DuplicateKey(UserId),

    #[error("Invalid network choice: {0}")]
    InvalidChoice(String),

    #[error("Empty input")]
    EmptyInput,

    #[error("Unexpected {input} while {from}")]
    InvalidTransition { from: FlowState, input: &'static str },

    #[error("Session is missing {0}")]
    IncompleteSession(&'static str),

    #[error("Claim store error: {0}")]
    Store(#[from] PortError),
}

impl ClaimError {
    /// True for errors caused by what the user typed or pressed, which are
    /// answered with a re-prompt rather than an apology
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            ClaimError::InvalidChoice(_) | ClaimError::EmptyInput | ClaimError::InvalidTransition { .. }
        )
    }
}
