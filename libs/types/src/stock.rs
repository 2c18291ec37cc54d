//! Catalog entry types

use crate::errors::{LedgerError, LedgerResult};
use crate::ids::StockId;
use crate::numeric::Price;
use serde::{Deserialize, Serialize};

/// Longest accepted ticker symbol
pub const MAX_TICKER_LEN: usize = 16;

/// A tradable stock and its administrator-set price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub id: StockId,
    pub ticker: String,
    pub price: Price,
}

impl Stock {
    pub fn new(ticker: impl Into<String>, price: Price) -> Self {
        Self {
            id: StockId::new(),
            ticker: ticker.into(),
            price,
        }
    }
}

/// Trim and validate a ticker. Tickers match exactly, case included.
pub fn normalize_ticker(raw: &str) -> LedgerResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::invalid("ticker must not be empty"));
    }
    if trimmed.len() > MAX_TICKER_LEN {
        return Err(LedgerError::invalid(format!(
            "ticker must be at most {} characters",
            MAX_TICKER_LEN
        )));
    }
    if trimmed.chars().any(|c| c.is_whitespace() || c == '/') {
        return Err(LedgerError::invalid(
            "ticker must not contain whitespace or '/'",
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalize_ticker() {
        assert_eq!(normalize_ticker(" AAPL ").unwrap(), "AAPL");
        assert!(normalize_ticker("").is_err());
        assert!(normalize_ticker("BRK A").is_err());
        assert!(normalize_ticker("WAYTOOLONGTICKERSYMBOL").is_err());
    }

    #[test]
    fn test_stock_json_shape() {
        let stock = Stock::new("AAPL", Price::new(dec!(150.25)).unwrap());
        let json = serde_json::to_value(&stock).unwrap();
        assert_eq!(json["ticker"], "AAPL");
        assert_eq!(json["price"], "150.25");
    }
}
