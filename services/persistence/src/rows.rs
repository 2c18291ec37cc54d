//! Row types for sqlx mapping, and their conversion into domain types

use crate::error::StoreError;
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use types::account::Account;
use types::ids::{CredentialId, StockId, TransactionId, UserId};
use types::numeric::{Money, Price, Volume};
use types::stock::Stock;
use types::transaction::{Transaction, TransactionType};

/// Fixed-width UTC form used for every stored timestamp
pub fn encode_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_timestamp(table: &'static str, raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::corrupt(table, format!("timestamp {:?}: {}", raw, e)))
}

fn decimal(table: &'static str, raw: &str) -> Result<Decimal, StoreError> {
    Decimal::from_str_exact(raw)
        .map_err(|e| StoreError::corrupt(table, format!("decimal {:?}: {}", raw, e)))
}

fn parse_id<T: FromStr>(table: &'static str, raw: &str) -> Result<T, StoreError>
where
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| StoreError::corrupt(table, format!("id {:?}: {}", raw, e)))
}

/// Row type for the `users` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub balance: String,
}

impl TryFrom<UserRow> for Account {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let balance = Money::new(decimal("users", &row.balance)?)
            .map_err(|e| StoreError::corrupt("users", e))?;
        Ok(Account {
            id: parse_id::<UserId>("users", &row.id)?,
            username: row.username,
            balance,
        })
    }
}

/// Row type for the `stocks` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StockRow {
    pub id: String,
    pub ticker: String,
    pub price: String,
}

impl TryFrom<StockRow> for Stock {
    type Error = StoreError;

    fn try_from(row: StockRow) -> Result<Self, Self::Error> {
        let price = Price::new(decimal("stocks", &row.price)?)
            .map_err(|e| StoreError::corrupt("stocks", e))?;
        Ok(Stock {
            id: parse_id::<StockId>("stocks", &row.id)?,
            ticker: row.ticker,
            price,
        })
    }
}

/// Row type for the `transactions` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TransactionRow {
    pub id: String,
    pub user_id: String,
    pub ticker: String,
    pub transaction_type: String,
    pub transaction_volume: i64,
    pub unit_price: String,
    pub transaction_price: String,
    pub timestamp: String,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = StoreError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        const TABLE: &str = "transactions";
        let transaction_type = TransactionType::from_str(&row.transaction_type)
            .map_err(|e| StoreError::corrupt(TABLE, e))?;
        let transaction_volume =
            Volume::new(row.transaction_volume).map_err(|e| StoreError::corrupt(TABLE, e))?;
        let unit_price =
            Price::new(decimal(TABLE, &row.unit_price)?).map_err(|e| StoreError::corrupt(TABLE, e))?;

        Ok(Transaction {
            id: parse_id::<TransactionId>(TABLE, &row.id)?,
            user_id: parse_id::<UserId>(TABLE, &row.user_id)?,
            ticker: row.ticker,
            transaction_type,
            transaction_volume,
            unit_price,
            transaction_price: decimal(TABLE, &row.transaction_price)?,
            timestamp: decode_timestamp(TABLE, &row.timestamp)?,
        })
    }
}

/// Stored login credentials
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub id: CredentialId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Row type for the `auth_users` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CredentialRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl TryFrom<CredentialRow> for Credential {
    type Error = StoreError;

    fn try_from(row: CredentialRow) -> Result<Self, Self::Error> {
        Ok(Credential {
            id: parse_id::<CredentialId>("auth_users", &row.id)?,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
        })
    }
}
