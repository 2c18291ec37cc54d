//! Trading account types
//!
//! An account is a username with a cash balance. Only the settlement
//! engine changes the balance, and only through `Money::debit` and
//! `Money::credit`, which refuse to go below zero.

use crate::errors::{LedgerError, LedgerResult};
use crate::ids::UserId;
use crate::numeric::Money;
use serde::{Deserialize, Serialize};

/// Longest accepted username, in characters
pub const MAX_USERNAME_LEN: usize = 64;

/// Account record as stored and returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: UserId,
    pub username: String,
    pub balance: Money,
}

impl Account {
    /// Create a new account with a fresh id
    pub fn new(username: impl Into<String>, balance: Money) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            balance,
        }
    }
}

/// Trim and validate a username supplied by a client.
///
/// Case is preserved for display; lookups compare case-insensitively.
pub fn normalize_username(raw: &str) -> LedgerResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::invalid("username must not be empty"));
    }
    if trimmed.chars().count() > MAX_USERNAME_LEN {
        return Err(LedgerError::invalid(format!(
            "username must be at most {} characters",
            MAX_USERNAME_LEN
        )));
    }
    if trimmed.contains('/') {
        return Err(LedgerError::invalid("username must not contain '/'"));
    }
    Ok(trimmed.to_string())
}

/// Case-insensitive username equality, matching how the store compares
pub fn same_username(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_account_creation() {
        let account = Account::new("alice", Money::new(dec!(1000.00)).unwrap());
        assert_eq!(account.username, "alice");
        assert_eq!(account.balance.as_decimal(), dec!(1000.00));
    }

    #[test]
    fn test_normalize_trims_and_keeps_case() {
        assert_eq!(normalize_username("  Alice ").unwrap(), "Alice");
    }

    #[test]
    fn test_normalize_rejects_blank() {
        assert!(normalize_username("   ").is_err());
    }

    #[test]
    fn test_normalize_rejects_path_separator() {
        assert!(normalize_username("a/b").is_err());
    }

    #[test]
    fn test_same_username_ignores_case() {
        assert!(same_username("ALICE", "alice "));
        assert!(!same_username("alice", "bob"));
    }

    #[test]
    fn test_account_json_shape() {
        let account = Account::new("alice", Money::new(dec!(398.00)).unwrap());
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["username"], "alice");
        assert_eq!(json["balance"], "398.00");
    }
}
