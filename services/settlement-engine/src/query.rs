//! Transaction Query
//!
//! Read-only views over the ledger. An unknown username yields an empty
//! history rather than an error.

use chrono::{DateTime, Utc};
use persistence::{LedgerStore, TimeRange};
use std::sync::Arc;
use types::account::normalize_username;
use types::errors::{LedgerError, LedgerResult};
use types::transaction::Transaction;

#[derive(Debug, Clone)]
pub struct TransactionQuery {
    store: Arc<LedgerStore>,
}

impl TransactionQuery {
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    /// Newest first
    pub async fn list_transactions(&self, username: &str) -> LedgerResult<Vec<Transaction>> {
        let username = normalize_username(username)?;
        Ok(self.store.list_transactions(&username, None).await?)
    }

    /// Newest first, limited to `start <= timestamp <= end`
    pub async fn list_transactions_in_range(
        &self,
        username: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> LedgerResult<Vec<Transaction>> {
        if start > end {
            return Err(LedgerError::invalid(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        let username = normalize_username(username)?;
        Ok(self
            .store
            .list_transactions(&username, Some(TimeRange { start, end }))
            .await?)
    }
}
