//! Error types for the trading ledger
//!
//! One taxonomy shared by every layer. The gateway maps each kind to an
//! HTTP status; the store maps its own failures into `Unavailable` or
//! `Internal`.

use rust_decimal::Decimal;
use thiserror::Error;

/// Top-level ledger error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Decimal, available: Decimal },

    #[error("User already exists: {username}")]
    DuplicateUser { username: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification used by transports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Unauthorized,
    InsufficientFunds,
    Conflict,
    Unavailable,
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code for response bodies
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::InsufficientFunds => "INSUFFICIENT_FUNDS",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Unavailable => "UNAVAILABLE",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }
}

impl LedgerError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn user_not_found(username: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "User",
            key: username.into(),
        }
    }

    pub fn stock_not_found(ticker: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "Stock",
            key: ticker.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidInput(_) => ErrorKind::InvalidInput,
            LedgerError::NotFound { .. } => ErrorKind::NotFound,
            LedgerError::Unauthorized(_) => ErrorKind::Unauthorized,
            LedgerError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            LedgerError::DuplicateUser { .. } | LedgerError::Conflict(_) => ErrorKind::Conflict,
            LedgerError::Unavailable(_) => ErrorKind::Unavailable,
            LedgerError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether a client may retry the same request unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Unavailable)
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_insufficient_funds_display() {
        let err = LedgerError::InsufficientFunds {
            required: dec!(450.75),
            available: dec!(399.00),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds: required 450.75, available 399.00"
        );
    }

    #[test]
    fn test_not_found_display() {
        assert_eq!(
            LedgerError::stock_not_found("AAPL").to_string(),
            "Stock not found: AAPL"
        );
    }

    #[test]
    fn test_duplicate_user_is_conflict() {
        let err = LedgerError::DuplicateUser {
            username: "alice".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.kind().code(), "CONFLICT");
    }

    #[test]
    fn test_only_unavailable_is_retryable() {
        assert!(LedgerError::Unavailable("timeout".into()).is_retryable());
        assert!(!LedgerError::Internal("bad row".into()).is_retryable());
        assert!(!LedgerError::invalid("volume").is_retryable());
    }
}
