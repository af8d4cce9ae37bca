//! Database Test Utilities
//!
//! Provides a migrated in-memory SQLite database for integration tests.
//! Each `TestDatabase` is private to the test that created it.

use infra_db::{
    create_pool, run_migrations, DatabaseConfig, DatabaseError, DatabasePool, SqliteClaimStore,
};

/// A migrated in-memory database
pub struct TestDatabase {
    pool: DatabasePool,
}

impl TestDatabase {
    /// Opens a fresh in-memory database and applies the migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created or a migration fails
    pub async fn new() -> Result<Self, DatabaseError> {
        let pool = create_pool(DatabaseConfig::in_memory()).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Claim store adapter over this database
    pub fn claim_store(&self) -> SqliteClaimStore {
        SqliteClaimStore::new(self.pool.clone())
    }
}

/// Helper macro for running database tests
#[macro_export]
macro_rules! db_test {
    ($name:ident, |$db:ident| $body:block) => {
        #[tokio::test]
        async fn $name() {
            let $db = $crate::database::TestDatabase::new()
                .await
                .expect("Failed to create test database");
            $body
        }
    };
}
