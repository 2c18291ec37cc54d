//! `users` table

use crate::error::StoreResult;
use crate::rows::{encode_timestamp, UserRow};
use crate::store::LedgerStore;
use chrono::Utc;
use sqlx::SqlitePool;
use types::account::Account;
use types::ids::UserId;

impl LedgerStore {
    /// Insert a new account. A taken username surfaces as `UniqueViolation`.
    pub async fn insert_account(&self, account: &Account) -> StoreResult<()> {
        let pool = self.pool();
        self.guarded("insert_account", || insert_account(pool, account))
            .await
    }

    /// Case-insensitive lookup by username
    pub async fn find_account_by_username(&self, username: &str) -> StoreResult<Option<Account>> {
        let pool = self.pool();
        self.guarded("find_account_by_username", || {
            find_account_by_username(pool, username)
        })
        .await
    }

    pub async fn find_account_by_id(&self, id: UserId) -> StoreResult<Option<Account>> {
        let pool = self.pool();
        self.guarded("find_account_by_id", || find_account_by_id(pool, id))
            .await
    }
}

async fn insert_account(pool: &SqlitePool, account: &Account) -> StoreResult<()> {
    let now = encode_timestamp(&Utc::now());
    sqlx::query(
        "INSERT INTO users (id, username, balance, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(account.id.to_string())
    .bind(&account.username)
    .bind(account.balance.to_string())
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;
    Ok(())
}

async fn find_account_by_username(pool: &SqlitePool, username: &str) -> StoreResult<Option<Account>> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, balance FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    row.map(Account::try_from).transpose()
}

async fn find_account_by_id(pool: &SqlitePool, id: UserId) -> StoreResult<Option<Account>> {
    let row = sqlx::query_as::<_, UserRow>("SELECT id, username, balance FROM users WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(pool)
        .await?;
    row.map(Account::try_from).transpose()
}
