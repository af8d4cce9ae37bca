//! Claims repository implementation
//!
//! This module provides database access for filed claims. The table is
//! append-only: there are no update or delete statements.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::instrument;

use crate::error::DatabaseError;

/// Repository for managing claims data
#[derive(Debug, Clone)]
pub struct ClaimsRepository {
    pool: SqlitePool,
}

impl ClaimsRepository {
    /// Creates a new ClaimsRepository with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns true if a claim exists for the user
    #[instrument(skip(self))]
    pub async fn exists(&self, user_id: i64) -> Result<bool, DatabaseError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM claims WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    /// Retrieves the claim filed by a user
    #[instrument(skip(self))]
    pub async fn find_by_user(&self, user_id: i64) -> Result<Option<ClaimRow>, DatabaseError> {
        let row = sqlx::query_as::<_, ClaimRow>(
            r#"
            SELECT user_id, handle, network, wallet_address, status, created_at
            FROM claims
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Inserts a claim
    ///
    /// A single statement against the primary key, so concurrent inserts for
    /// one user cannot both succeed and an existing row is never replaced.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::DuplicateEntry` if the user already has a claim
    #[instrument(skip(self, claim), fields(user_id = claim.user_id))]
    pub async fn insert(&self, claim: &ClaimRow) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            INSERT INTO claims (user_id, handle, network, wallet_address, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(claim.user_id)
        .bind(&claim.handle)
        .bind(&claim.network)
        .bind(&claim.wallet_address)
        .bind(&claim.status)
        .bind(claim.created_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::duplicate("Claim", "user_id", claim.user_id));
        }
        Ok(())
    }

    /// Counts all claims
    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM claims")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    /// Checks that the database answers queries
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Database row for the claims table
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ClaimRow {
    pub user_id: i64,
    pub handle: String,
    pub network: String,
    pub wallet_address: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
