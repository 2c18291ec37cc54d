//! Pooled store handle
//!
//! One `LedgerStore` is built at startup and shared by every service.
//! Every public operation goes through `guarded`, which bounds it with
//! the configured timeout and retries transient failures.

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::schema;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::future::Future;
use std::str::FromStr;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct LedgerStore {
    pool: SqlitePool,
    config: StoreConfig,
}

impl LedgerStore {
    /// Open the pool and bring the schema up to date
    pub async fn connect(config: StoreConfig) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .max_lifetime(config.max_lifetime)
            .idle_timeout(config.idle_timeout)
            .connect_with(options)
            .await?;

        schema::migrate(&pool).await?;

        info!(
            database_url = %config.database_url,
            max_connections = config.max_connections,
            "Ledger store ready"
        );

        Ok(Self { pool, config })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Cheap liveness probe
    pub async fn ping(&self) -> StoreResult<()> {
        let pool = &self.pool;
        self.guarded("ping", || async move {
            sqlx::query("SELECT 1").execute(pool).await?;
            Ok::<_, StoreError>(())
        })
        .await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Run `op`, retrying transient failures, all within one operation
    /// timeout.
    ///
    /// Retries share the bound with the first attempt. Dropping a timed-out
    /// operation drops any open transaction, which rolls it back.
    pub(crate) async fn guarded<T, F, Fut>(&self, operation: &'static str, mut op: F) -> StoreResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let retries = self.config.transient_retries;
        let attempts = async {
            let mut attempt: u32 = 0;
            loop {
                match op().await {
                    Err(err) if err.is_transient() && attempt < retries => {
                        attempt += 1;
                        warn!(operation, attempt, error = %err, "Retrying transient store failure");
                    }
                    other => return other,
                }
            }
        };

        match tokio::time::timeout(self.config.operation_timeout, attempts).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, timeout = ?self.config.operation_timeout, "Store operation timed out");
                Err(StoreError::Timeout {
                    operation,
                    after: self.config.operation_timeout,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    async fn store_with(dir: &std::path::Path, timeout: Duration, retries: u32) -> LedgerStore {
        let mut config = StoreConfig::new(format!("sqlite://{}", dir.join("guard.db").display()));
        config.operation_timeout = timeout;
        config.transient_retries = retries;
        LedgerStore::connect(config).await.unwrap()
    }

    #[tokio::test]
    async fn test_retries_share_one_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(dir.path(), Duration::from_millis(100), 10).await;

        let started = Instant::now();
        let result: StoreResult<()> = store
            .guarded("always_busy", || async {
                tokio::time::sleep(Duration::from_millis(40)).await;
                Err(StoreError::from(sqlx::Error::PoolTimedOut))
            })
            .await;

        assert!(matches!(result, Err(StoreError::Timeout { operation: "always_busy", .. })));
        // Per-attempt bounds would have allowed 11 x 100ms.
        assert!(started.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(dir.path(), Duration::from_secs(1), 1).await;

        let mut calls = 0;
        let result = store
            .guarded("flaky", || {
                calls += 1;
                let first = calls == 1;
                async move {
                    if first {
                        Err(StoreError::from(sqlx::Error::PoolTimedOut))
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls, 2);
    }
}
