//! Decimal types for balances, prices and volumes
//!
//! Uses rust_decimal for exact arithmetic. Nothing here ever touches a
//! float, so repeated settlements cannot drift a balance.

use crate::errors::{LedgerError, LedgerResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A non-negative cash amount (account balance)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Create a balance, rejecting negative amounts
    pub fn new(amount: Decimal) -> LedgerResult<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(LedgerError::invalid(format!(
                "balance must not be negative, got {}",
                amount
            )));
        }
        Ok(Self(amount))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Subtract `amount`, failing if the result would be negative
    pub fn debit(self, amount: Decimal) -> LedgerResult<Self> {
        if self.0 < amount {
            return Err(LedgerError::InsufficientFunds {
                required: amount,
                available: self.0,
            });
        }
        let remaining = self
            .0
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::invalid("debit overflows balance"))?;
        Ok(Self(remaining))
    }

    /// Add `amount`, failing on overflow
    pub fn credit(self, amount: Decimal) -> LedgerResult<Self> {
        let total = self
            .0
            .checked_add(amount)
            .ok_or_else(|| LedgerError::invalid("credit overflows balance"))?;
        Self::new(total)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str_exact(s)
            .map_err(|e| LedgerError::invalid(format!("invalid amount {:?}: {}", s, e)))?;
        Self::new(amount)
    }
}

/// A strictly positive unit price
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a price, rejecting zero and negative values
    pub fn new(value: Decimal) -> LedgerResult<Self> {
        if value <= Decimal::ZERO {
            return Err(LedgerError::invalid(format!(
                "price must be positive, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Total cost of `volume` units at this price
    pub fn total(&self, volume: Volume) -> LedgerResult<Decimal> {
        self.0
            .checked_mul(Decimal::from(volume.get()))
            .ok_or_else(|| {
                LedgerError::invalid(format!("{} x {} overflows", self.0, volume.get()))
            })
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str_exact(s)
            .map_err(|e| LedgerError::invalid(format!("invalid price {:?}: {}", s, e)))?;
        Self::new(value)
    }
}

/// A strictly positive whole number of shares
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Volume(i64);

impl Volume {
    pub fn new(value: i64) -> LedgerResult<Self> {
        if value <= 0 {
            return Err(LedgerError::invalid(format!(
                "volume must be a positive integer, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
