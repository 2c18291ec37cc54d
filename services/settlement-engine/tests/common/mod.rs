#![allow(dead_code)]

use persistence::{LedgerStore, StoreConfig};
use settlement_engine::Ledger;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub async fn open_store(dir: &Path) -> Arc<LedgerStore> {
    let url = format!("sqlite://{}", dir.join("ledger.db").display());
    Arc::new(LedgerStore::connect(StoreConfig::new(url)).await.unwrap())
}

/// Fresh ledger over an empty database; keep the TempDir alive
pub async fn open_ledger() -> (TempDir, Ledger) {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(dir.path()).await;
    (dir, Ledger::new(store))
}
