//! Repository operations on `LedgerStore`, one module per table family

pub mod accounts;
pub mod catalog;
pub mod credentials;
pub mod ledger;

pub use ledger::{SettlementWrite, TimeRange};
