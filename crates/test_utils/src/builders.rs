//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use chrono::{DateTime, Utc};
use core_kernel::UserId;
use domain_claims::{ClaimRecord, ClaimStatus, Network};

use crate::fixtures::{AnswerFixtures, IdFixtures, TemporalFixtures};

/// Builder for constructing claim records
pub struct ClaimRecordBuilder {
    user_id: UserId,
    handle: String,
    network: Network,
    wallet_address: String,
    created_at: DateTime<Utc>,
}

impl Default for ClaimRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimRecordBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            user_id: IdFixtures::alice(),
            handle: AnswerFixtures::handle().to_string(),
            network: AnswerFixtures::network(),
            wallet_address: AnswerFixtures::wallet().to_string(),
            created_at: TemporalFixtures::filed_at(),
        }
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = handle.into();
        self
    }

    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    pub fn with_wallet(mut self, wallet: impl Into<String>) -> Self {
        self.wallet_address = wallet.into();
        self
    }

    /// Builds the record
    pub fn build(self) -> ClaimRecord {
        ClaimRecord {
            user_id: self.user_id,
            handle: self.handle,
            network: self.network,
            wallet_address: self.wallet_address,
            status: ClaimStatus::Pending,
            created_at: self.created_at,
        }
    }

    /// Builds one record per user, all other fields defaulted
    pub fn for_users(users: impl IntoIterator<Item = UserId>) -> Vec<ClaimRecord> {
        users
            .into_iter()
            .map(|user| Self::new().with_user(user).build())
            .collect()
    }
}
