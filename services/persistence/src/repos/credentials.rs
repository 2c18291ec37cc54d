//! `auth_users` table

use crate::error::StoreResult;
use crate::rows::{encode_timestamp, Credential, CredentialRow};
use crate::store::LedgerStore;
use chrono::Utc;
use sqlx::SqlitePool;

impl LedgerStore {
    /// Store credentials. A taken username surfaces as `UniqueViolation`.
    pub async fn insert_credential(&self, credential: &Credential) -> StoreResult<()> {
        let pool = self.pool();
        self.guarded("insert_credential", || insert_credential(pool, credential))
            .await
    }

    /// Case-insensitive lookup by username
    pub async fn find_credential(&self, username: &str) -> StoreResult<Option<Credential>> {
        let pool = self.pool();
        self.guarded("find_credential", || find_credential(pool, username))
            .await
    }
}

async fn insert_credential(pool: &SqlitePool, credential: &Credential) -> StoreResult<()> {
    sqlx::query(
        "INSERT INTO auth_users (id, username, email, password_hash, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(credential.id.to_string())
    .bind(&credential.username)
    .bind(&credential.email)
    .bind(&credential.password_hash)
    .bind(encode_timestamp(&Utc::now()))
    .execute(pool)
    .await?;
    Ok(())
}

async fn find_credential(pool: &SqlitePool, username: &str) -> StoreResult<Option<Credential>> {
    let row = sqlx::query_as::<_, CredentialRow>(
        "SELECT id, username, email, password_hash FROM auth_users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    row.map(Credential::try_from).transpose()
}
