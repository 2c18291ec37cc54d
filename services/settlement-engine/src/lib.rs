//! Settlement Engine Service
//!
//! The business layer of the trading ledger:
//! - `accounts`: create and look up trading accounts
//! - `catalog`: list stocks and their administrator-set prices
//! - `settlement`: execute BUY/SELL against a balance, atomically
//! - `query`: read a user's transaction history
//!
//! All services share one pooled `LedgerStore`. Callers are expected to
//! have authenticated the user already.

pub mod accounts;
pub mod catalog;
pub mod locks;
pub mod query;
pub mod settlement;

use persistence::LedgerStore;
use std::sync::Arc;

pub use accounts::AccountService;
pub use catalog::CatalogService;
pub use query::TransactionQuery;
pub use settlement::{SettlementEngine, SettlementReceipt, SettlementRequest};

/// All ledger services over one shared store
#[derive(Debug, Clone)]
pub struct Ledger {
    pub accounts: AccountService,
    pub catalog: CatalogService,
    pub settlement: SettlementEngine,
    pub transactions: TransactionQuery,
    store: Arc<LedgerStore>,
}

impl Ledger {
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self {
            accounts: AccountService::new(Arc::clone(&store)),
            catalog: CatalogService::new(Arc::clone(&store)),
            settlement: SettlementEngine::new(Arc::clone(&store)),
            transactions: TransactionQuery::new(Arc::clone(&store)),
            store,
        }
    }

    pub fn store(&self) -> &Arc<LedgerStore> {
        &self.store
    }
}
