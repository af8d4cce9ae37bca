//! SQLite Claim Store Adapter
//!
//! Implements the domain's `ClaimStore` port on top of `ClaimsRepository`,
//! converting between `ClaimRecord` and `ClaimRow` and translating database
//! errors into port errors. A duplicate insert surfaces as
//! `PortError::Conflict`.

use async_trait::async_trait;
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError, UserId,
};
use domain_claims::{ClaimRecord, ClaimStore, Network};

use crate::error::DatabaseError;
use crate::pool::DatabasePool;
use crate::repositories::claims::{ClaimRow, ClaimsRepository};

/// SQLite-backed implementation of the ClaimStore trait
#[derive(Debug, Clone)]
pub struct SqliteClaimStore {
    repository: ClaimsRepository,
}

impl SqliteClaimStore {
    /// Creates a new adapter over the given pool
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            repository: ClaimsRepository::new(pool),
        }
    }

    /// Loads the claim filed by a user, if any
    pub async fn get(&self, user_id: UserId) -> Result<Option<ClaimRecord>, PortError> {
        self.repository
            .find_by_user(user_id.get())
            .await?
            .map(ClaimRecord::try_from_row)
            .transpose()
            .map_err(PortError::from)
    }
}

/// Conversions between the domain record and the table row
trait RowMapping: Sized {
    fn to_row(&self) -> ClaimRow;
    fn try_from_row(row: ClaimRow) -> Result<Self, DatabaseError>;
}

impl RowMapping for ClaimRecord {
    fn to_row(&self) -> ClaimRow {
        ClaimRow {
            user_id: self.user_id.get(),
            handle: self.handle.clone(),
            network: self.network.code().to_string(),
            wallet_address: self.wallet_address.clone(),
            status: self.status.as_str().to_string(),
            created_at: self.created_at,
        }
    }

    fn try_from_row(row: ClaimRow) -> Result<Self, DatabaseError> {
        let network: Network = row
            .network
            .parse()
            .map_err(|_| DatabaseError::SerializationError(format!("unknown network '{}'", row.network)))?;
        let status = row
            .status
            .parse()
            .map_err(|e| DatabaseError::SerializationError(format!("{e}")))?;

        Ok(ClaimRecord {
            user_id: UserId::new(row.user_id),
            handle: row.handle,
            network,
            wallet_address: row.wallet_address,
            status,
            created_at: row.created_at,
        })
    }
}

impl DomainPort for SqliteClaimStore {}

#[async_trait]
impl HealthCheckable for SqliteClaimStore {
    async fn health_check(&self) -> HealthCheckResult {
        let started = Instant::now();
        let (status, message) = match self.repository.ping().await {
            Ok(()) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(e.to_string())),
        };

        HealthCheckResult {
            adapter_id: "sqlite-claim-store".to_string(),
            status,
            latency_ms: started.elapsed().as_millis() as u64,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl ClaimStore for SqliteClaimStore {
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn exists(&self, user_id: UserId) -> Result<bool, PortError> {
        Ok(self.repository.exists(user_id.get()).await?)
    }

    #[instrument(skip(self, record), fields(user_id = %record.user_id))]
    async fn insert(&self, record: &ClaimRecord) -> Result<(), PortError> {
        self.repository.insert(&record.to_row()).await?;
        debug!("claim row inserted");
        Ok(())
    }

    async fn count(&self) -> Result<u64, PortError> {
        let total = self.repository.count().await?;
        Ok(total.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use domain_claims::ClaimStatus;

    #[test]
    fn test_record_maps_to_uppercase_row() {
        let mut record = ClaimRecord::pending(UserId::new(3), "player1", Network::Sol, "So1ana");
        record.created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let row = record.to_row();
        assert_eq!(row.user_id, 3);
        assert_eq!(row.network, "SOL");
        assert_eq!(row.status, "PENDING");

        let back = ClaimRecord::try_from_row(row).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_lowercase_row_is_readable() {
        let row = ClaimRow {
            user_id: 9,
            handle: "old".to_string(),
            network: "eth".to_string(),
            wallet_address: "0x1".to_string(),
            status: "pending".to_string(),
            created_at: Utc::now(),
        };
        let record = ClaimRecord::try_from_row(row).unwrap();
        assert_eq!(record.network, Network::Eth);
        assert_eq!(record.status, ClaimStatus::Pending);
    }

    #[test]
    fn test_unknown_network_is_serialization_error() {
        let row = ClaimRow {
            user_id: 9,
            handle: "old".to_string(),
            network: "DOGE".to_string(),
            wallet_address: "D1".to_string(),
            status: "PENDING".to_string(),
            created_at: Utc::now(),
        };
        assert!(matches!(
            ClaimRecord::try_from_row(row),
            Err(DatabaseError::SerializationError(_))
        ));
    }
}
