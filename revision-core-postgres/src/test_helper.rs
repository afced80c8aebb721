//! Test helper module for transaction-based test isolation
//!
//! Every test runs inside a unit-of-work transaction that is rolled back when the
//! context and the repositories built from it are dropped. Tests are skipped when
//! `DATABASE_URL` is not set.

use postgres_unit_of_work::Executor;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::repository::record_repository::RecordRepositoryImpl;

pub struct TestContext {
    pub executor: Executor,
}

impl TestContext {
    /// Repository on a collection name unique to the calling test
    pub fn record_repository(&self) -> Arc<RecordRepositoryImpl> {
        Arc::new(RecordRepositoryImpl::new(
            self.executor.clone(),
            format!("test_{}", Uuid::new_v4().simple()),
        ))
    }
}

/// Connect, migrate and open the transaction a test runs in
///
/// Returns `Ok(None)` when no database is configured.
pub async fn setup_test_context() -> Result<Option<TestContext>, Box<dyn std::error::Error + Send + Sync>> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&database_url)
        .await?;

    sqlx::migrate!().run(&pool).await?;

    let tx = pool.begin().await?;
    Ok(Some(TestContext {
        executor: Executor::new(tx),
    }))
}
