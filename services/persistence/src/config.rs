//! Store configuration

use std::time::Duration;

/// Connection pool and timeout settings for the ledger store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// SQLite URL, e.g. `sqlite://ledger.db`
    pub database_url: String,
    /// Upper bound on pooled connections
    pub max_connections: u32,
    /// How long to wait for a free pooled connection
    pub acquire_timeout: Duration,
    /// Bound on a single store operation, retries included
    pub operation_timeout: Duration,
    /// Connections are recycled after this long
    pub max_lifetime: Duration,
    /// Idle connections are closed after this long
    pub idle_timeout: Duration,
    /// How long SQLite waits on a locked database before reporting busy
    pub busy_timeout: Duration,
    /// Extra attempts for transient failures
    pub transient_retries: u32,
}

impl StoreConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::default()
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://ledger.db".to_string(),
            max_connections: 8,
            acquire_timeout: Duration::from_secs(3),
            operation_timeout: Duration::from_secs(5),
            max_lifetime: Duration::from_secs(30 * 60),
            idle_timeout: Duration::from_secs(5 * 60),
            busy_timeout: Duration::from_secs(2),
            transient_retries: 1,
        }
    }
}
