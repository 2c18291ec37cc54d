//! `transactions` table and the atomic settlement write

use crate::error::{StoreError, StoreResult};
use crate::rows::{encode_timestamp, TransactionRow};
use crate::store::LedgerStore;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use types::numeric::Money;
use types::transaction::Transaction;

/// Everything one settlement persists
#[derive(Debug, Clone, Copy)]
pub struct SettlementWrite<'a> {
    /// Balance the engine read before computing `new_balance`
    pub observed_balance: Money,
    pub new_balance: Money,
    pub transaction: &'a Transaction,
}

/// Inclusive timestamp window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl LedgerStore {
    /// Apply a balance change and append its ledger entry as one unit.
    ///
    /// The balance update is conditional on the balance still being
    /// `observed_balance`; if anything else changed it first, nothing is
    /// written and `StoreError::Conflict` is returned.
    pub async fn settle(&self, write: &SettlementWrite<'_>) -> StoreResult<()> {
        let pool = self.pool();
        self.guarded("settle", || settle(pool, write)).await
    }

    /// A user's entries, newest first, optionally limited to `range`
    pub async fn list_transactions(
        &self,
        username: &str,
        range: Option<TimeRange>,
    ) -> StoreResult<Vec<Transaction>> {
        let pool = self.pool();
        self.guarded("list_transactions", || {
            list_transactions(pool, username, range)
        })
        .await
    }
}

async fn settle(pool: &SqlitePool, write: &SettlementWrite<'_>) -> StoreResult<()> {
    let tx_record = write.transaction;
    let mut tx = pool.begin().await?;

    // Writing first takes the write lock up front, so the read-check-write
    // below never needs to upgrade a read snapshot.
    let updated = sqlx::query(
        "UPDATE users SET balance = ?, updated_at = ? WHERE id = ? AND balance = ?",
    )
    .bind(write.new_balance.to_string())
    .bind(encode_timestamp(&tx_record.timestamp))
    .bind(tx_record.user_id.to_string())
    .bind(write.observed_balance.to_string())
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() != 1 {
        // tx is dropped here, which rolls back
        return Err(StoreError::Conflict(format!(
            "balance of user {} changed during settlement",
            tx_record.user_id
        )));
    }

    sqlx::query(
        r#"
        INSERT INTO transactions
            (id, user_id, ticker, transaction_type, transaction_volume, unit_price, transaction_price, timestamp)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(tx_record.id.to_string())
    .bind(tx_record.user_id.to_string())
    .bind(&tx_record.ticker)
    .bind(tx_record.transaction_type.as_str())
    .bind(tx_record.transaction_volume.get())
    .bind(tx_record.unit_price.to_string())
    .bind(tx_record.transaction_price.to_string())
    .bind(encode_timestamp(&tx_record.timestamp))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

const SELECT_FOR_USER: &str = r#"
    SELECT t.id, t.user_id, t.ticker, t.transaction_type, t.transaction_volume,
           t.unit_price, t.transaction_price, t.timestamp
    FROM transactions t
    INNER JOIN users u ON t.user_id = u.id
    WHERE u.username = ?
"#;

async fn list_transactions(
    pool: &SqlitePool,
    username: &str,
    range: Option<TimeRange>,
) -> StoreResult<Vec<Transaction>> {
    let rows = match range {
        None => {
            let sql = format!("{SELECT_FOR_USER} ORDER BY t.timestamp DESC, t.id DESC");
            sqlx::query_as::<_, TransactionRow>(&sql)
                .bind(username)
                .fetch_all(pool)
                .await?
        }
        Some(range) => {
            let sql = format!(
                "{SELECT_FOR_USER} AND t.timestamp >= ? AND t.timestamp <= ? \
                 ORDER BY t.timestamp DESC, t.id DESC"
            );
            sqlx::query_as::<_, TransactionRow>(&sql)
                .bind(username)
                .bind(encode_timestamp(&range.start))
                .bind(encode_timestamp(&range.end))
                .fetch_all(pool)
                .await?
        }
    };

    rows.into_iter().map(Transaction::try_from).collect()
}
