//! Ledger Store
//!
//! Pooled SQLite persistence for accounts, the stock catalog, the
//! append-only transaction ledger and login credentials.
//!
//! The one write with real invariants is `LedgerStore::settle`: the
//! balance update and the ledger insert commit together or not at all,
//! and the update only applies if the balance is still the one the
//! caller checked.

pub mod config;
pub mod error;
pub mod repos;
pub mod rows;
pub mod schema;
pub mod store;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use repos::{SettlementWrite, TimeRange};
pub use rows::Credential;
pub use store::LedgerStore;
