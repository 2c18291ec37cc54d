//! Types library for the stock trading ledger
//!
//! This library provides the domain types shared by the ledger store,
//! the settlement engine and the HTTP gateway, so that every layer agrees
//! on identifiers, decimal money handling and the error taxonomy.
//!
//! # Modules
//! - `ids`: Unique identifiers (UserId, StockId, TransactionId)
//! - `numeric`: Decimal types (Money, Price, Volume)
//! - `account`: User account and balance rules
//! - `stock`: Catalog entries
//! - `transaction`: Ledger entries and trade direction
//! - `errors`: Error taxonomy

// Public modules
pub mod ids;
pub mod numeric;
pub mod account;
pub mod stock;
pub mod transaction;
pub mod errors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::account::*;
    pub use crate::stock::*;
    pub use crate::transaction::*;
    pub use crate::errors::*;
}
