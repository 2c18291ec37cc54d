//! Store errors and their mapping into the ledger taxonomy

use std::time::Duration;
use thiserror::Error;
use types::errors::LedgerError;

// SQLite primary result codes
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("Concurrent modification: {0}")]
    Conflict(String),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Corrupt row in {table}: {reason}")]
    Corrupt { table: &'static str, reason: String },
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return StoreError::UniqueViolation(db.message().to_string());
            }
        }
        StoreError::Database(err)
    }
}

impl StoreError {
    pub(crate) fn corrupt(table: &'static str, reason: impl ToString) -> Self {
        StoreError::Corrupt {
            table,
            reason: reason.to_string(),
        }
    }

    /// Failures that may succeed if the same call is repeated
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Database(err) => is_transient_sqlx(err),
            _ => false,
        }
    }
}

fn is_transient_sqlx(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db) => db
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            .map(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
            .unwrap_or(false),
        _ => false,
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(msg) => LedgerError::Conflict(msg),
            StoreError::Conflict(msg) => LedgerError::Conflict(msg),
            StoreError::Timeout { .. } => LedgerError::Unavailable(err.to_string()),
            StoreError::Database(ref inner) if is_transient_sqlx(inner) => {
                LedgerError::Unavailable(err.to_string())
            }
            StoreError::Database(_) | StoreError::Corrupt { .. } => {
                LedgerError::Internal(err.to_string())
            }
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
