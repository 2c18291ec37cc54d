//! Ledger entry types
//!
//! A transaction is an immutable record of one settlement: who traded,
//! which ticker, in which direction, how many shares, at what price.

use crate::errors::LedgerError;
use crate::ids::{TransactionId, UserId};
use crate::numeric::{Price, Volume};
use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Debit the account by price x volume
    BUY,
    /// Credit the account by price x volume
    SELL,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::BUY => "BUY",
            TransactionType::SELL => "SELL",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(TransactionType::BUY),
            "SELL" => Ok(TransactionType::SELL),
            _ => Err(LedgerError::invalid(
                "transaction_type must be either BUY or SELL",
            )),
        }
    }
}

/// Append-only ledger entry
///
/// `transaction_price` is the total executed amount (unit price x volume);
/// `unit_price` is the catalog price snapshot it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub ticker: String,
    pub transaction_type: TransactionType,
    pub transaction_volume: Volume,
    pub unit_price: Price,
    pub transaction_price: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Build a new entry stamped with `executed_at`.
    ///
    /// The timestamp is truncated to microseconds, the precision the
    /// store keeps.
    pub fn new(
        user_id: UserId,
        ticker: impl Into<String>,
        transaction_type: TransactionType,
        transaction_volume: Volume,
        unit_price: Price,
        transaction_price: Decimal,
        executed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            user_id,
            ticker: ticker.into(),
            transaction_type,
            transaction_volume,
            unit_price,
            transaction_price,
            timestamp: executed_at.trunc_subsecs(6),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transaction_type_parse() {
        assert_eq!("BUY".parse::<TransactionType>().unwrap(), TransactionType::BUY);
        assert_eq!(" sell ".parse::<TransactionType>().unwrap(), TransactionType::SELL);
        assert!(matches!(
            "HOLD".parse::<TransactionType>(),
            Err(LedgerError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_transaction_truncates_to_micros() {
        let at = Utc.timestamp_opt(1_708_123_456, 123_456_789).unwrap();
        let tx = Transaction::new(
            UserId::new(),
            "AAPL",
            TransactionType::BUY,
            Volume::new(4).unwrap(),
            Price::new(dec!(150.25)).unwrap(),
            dec!(601.00),
            at,
        );
        assert_eq!(tx.timestamp.timestamp_subsec_nanos(), 123_456_000);
    }

    #[test]
    fn test_transaction_json_shape() {
        let tx = Transaction::new(
            UserId::new(),
            "AAPL",
            TransactionType::SELL,
            Volume::new(2).unwrap(),
            Price::new(dec!(150.25)).unwrap(),
            dec!(300.50),
            Utc::now(),
        );
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["transaction_type"], "SELL");
        assert_eq!(json["transaction_volume"], 2);
        assert_eq!(json["transaction_price"], "300.50");
        assert_eq!(json["unit_price"], "150.25");
    }
}
