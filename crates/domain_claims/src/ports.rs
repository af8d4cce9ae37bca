//! Claim Store Port
//!
//! The `ClaimStore` trait is the only way the domain reaches durable claim
//! storage. It is append-only: records are checked, inserted and counted,
//! never updated or deleted.
//!
//! # Adapters
//!
//! - **SQLite Adapter**: `infra_db::adapters::SqliteClaimStore`
//! - **Mock Adapter**: [`mock::MockClaimStore`], in memory, for tests
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_claims::{ClaimFlow, ClaimStore};
//! use std::sync::Arc;
//!
//! let store: Arc<dyn ClaimStore> = Arc::new(SqliteClaimStore::new(pool));
//! let flow = ClaimFlow::new(store);
//! ```

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, PortError, UserId};

use crate::claim::ClaimRecord;

/// Durable record of one claim per user
#[async_trait]
pub trait ClaimStore: DomainPort + HealthCheckable {
    /// Returns true iff a claim is on file for `user_id`
    async fn exists(&self, user_id: UserId) -> Result<bool, PortError>;

    /// Files a claim
    ///
    /// # Errors
    ///
    /// Returns `PortError::Conflict` when a claim for the same user is
    /// already on file. The existing record is left untouched. Concurrent
    /// inserts for one user must result in exactly one success.
    async fn insert(&self, record: &ClaimRecord) -> Result<(), PortError>;

    /// Total number of claims on file
    async fn count(&self) -> Result<u64, PortError>;
}

/// Mock implementation of ClaimStore for testing
///
/// Stores claims in memory; useful for unit testing without a database.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use core_kernel::{AdapterHealth, HealthCheckResult};
    use std::collections::hash_map::Entry;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory mock implementation of ClaimStore
    #[derive(Debug, Default)]
    pub struct MockClaimStore {
        claims: Arc<RwLock<HashMap<UserId, ClaimRecord>>>,
        unavailable: AtomicBool,
    }

    impl MockClaimStore {
        /// Creates a new mock store
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with claims for testing
        pub async fn with_claims(claims: Vec<ClaimRecord>) -> Self {
            let store = Self::new();
            {
                let mut map = store.claims.write().await;
                for claim in claims {
                    map.insert(claim.user_id, claim);
                }
            }
            store
        }

        /// Makes every subsequent call fail with a connection error
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        /// Returns the stored claim for a user
        pub async fn get(&self, user_id: UserId) -> Option<ClaimRecord> {
            self.claims.read().await.get(&user_id).cloned()
        }

        fn check_available(&self) -> Result<(), PortError> {
            if self.unavailable.load(Ordering::SeqCst) {
                Err(PortError::connection("mock claim store unavailable"))
            } else {
                Ok(())
            }
        }
    }

    impl DomainPort for MockClaimStore {}

    #[async_trait]
    impl HealthCheckable for MockClaimStore {
        async fn health_check(&self) -> HealthCheckResult {
            let status = if self.unavailable.load(Ordering::SeqCst) {
                AdapterHealth::Unhealthy
            } else {
                AdapterHealth::Healthy
            };
            HealthCheckResult {
                adapter_id: "mock-claim-store".to_string(),
                status,
                latency_ms: 0,
                message: None,
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl ClaimStore for MockClaimStore {
        async fn exists(&self, user_id: UserId) -> Result<bool, PortError> {
            self.check_available()?;
            Ok(self.claims.read().await.contains_key(&user_id))
        }

        async fn insert(&self, record: &ClaimRecord) -> Result<(), PortError> {
            self.check_available()?;
            match self.claims.write().await.entry(record.user_id) {
                Entry::Occupied(_) => Err(PortError::conflict(format!(
                    "claim for {} already exists",
                    record.user_id
                ))),
                Entry::Vacant(slot) => {
                    slot.insert(record.clone());
                    Ok(())
                }
            }
        }

        async fn count(&self) -> Result<u64, PortError> {
            self.check_available()?;
            Ok(self.claims.read().await.len() as u64)
        }
    }
}
