//! Claim record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{CoreError, UserId};
use crate::error::ClaimError;

/// Payout network the wallet address belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Network {
    Sol,
    Eth,
    Btc,
}

impl Network {
    /// Every selectable network, in the order the buttons are shown
    pub const ALL: [Network; 3] = [Network::Sol, Network::Eth, Network::Btc];

    /// Uppercase code used in callback data, storage and notices
    pub fn code(&self) -> &'static str {
        match self {
            Network::Sol => "SOL",
            Network::Eth => "ETH",
            Network::Btc => "BTC",
        }
    }

    /// Button label
    pub fn label(&self) -> &'static str {
        match self {
            Network::Sol => "Solana",
            Network::Eth => "ETH",
            Network::Btc => "BTC",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Network {
    type Err = ClaimError;

    /// Accepts the code in any casing; older keyboards sent `sol`/`eth`/`btc`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Network::ALL
            .into_iter()
            .find(|n| n.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| ClaimError::InvalidChoice(s.to_string()))
    }
}

/// Claim status. Only `Pending` is ever written by the intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClaimStatus {
    /// Filed, waiting for manual review
    Pending,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "PENDING",
        }
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("pending") {
            Ok(ClaimStatus::Pending)
        } else {
            Err(CoreError::validation(format!("unknown claim status '{}'", s)))
        }
    }
}

/// A filed claim, one per user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// Chat identity of the claimant, unique across records
    pub user_id: UserId,
    /// The claimant's username on the external service
    pub handle: String,
    /// Network of the payout wallet
    pub network: Network,
    /// Wallet address, stored as typed
    pub wallet_address: String,
    /// Status
    pub status: ClaimStatus,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl ClaimRecord {
    /// Creates a new pending claim
    pub fn pending(
        user_id: UserId,
        handle: impl Into<String>,
        network: Network,
        wallet_address: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            handle: handle.into(),
            network,
            wallet_address: wallet_address.into(),
            status: ClaimStatus::Pending,
            created_at: Utc::now(),
        }
    }
}
