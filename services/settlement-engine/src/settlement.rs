//! Settlement Engine
//!
//! Executes one BUY or SELL against an account at the stock's stored
//! price. The funds check and the balance write happen under the
//! account's lock, so a balance can never be overdrawn by racing requests.
//!
//! The lock only covers this process. The write is also conditional on the
//! balance the check saw; if another writer on the same database changed
//! it first, the account is re-read and the trade re-evaluated. A racing
//! writer can therefore turn a BUY into `InsufficientFunds` but never fail
//! an affordable one.
//!
//! SELL does not consult holdings: any account may sell any volume of
//! any listed ticker and is credited in cash.

use crate::locks::AccountLocks;
use chrono::Utc;
use persistence::{LedgerStore, SettlementWrite, StoreError};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use types::account::normalize_username;
use types::errors::{LedgerError, LedgerResult};
use types::numeric::{Money, Volume};
use types::stock::normalize_ticker;
use types::transaction::{Transaction, TransactionType};

/// Conditional-write attempts before a settlement gives up with `Conflict`
pub const MAX_SETTLE_ATTEMPTS: u32 = 32;

/// A trade as requested by an already-authenticated caller
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementRequest {
    pub username: String,
    pub ticker: String,
    pub transaction_type: TransactionType,
    /// Unchecked; must be positive
    pub volume: i64,
}

/// Outcome of a successful settlement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettlementReceipt {
    pub transaction: Transaction,
    pub balance: Money,
}

#[derive(Debug, Clone)]
pub struct SettlementEngine {
    store: Arc<LedgerStore>,
    locks: Arc<AccountLocks>,
}

impl SettlementEngine {
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self {
            store,
            locks: Arc::new(AccountLocks::new()),
        }
    }

    /// Validate and settle a single trade.
    ///
    /// Either the balance change and its ledger entry are both stored, or
    /// neither is.
    pub async fn execute(&self, request: SettlementRequest) -> LedgerResult<SettlementReceipt> {
        let username = normalize_username(&request.username)?;
        let account = self
            .store
            .find_account_by_username(&username)
            .await?
            .ok_or_else(|| LedgerError::user_not_found(&username))?;

        let ticker = normalize_ticker(&request.ticker)?;
        let stock = self
            .store
            .find_stock(&ticker)
            .await?
            .ok_or_else(|| LedgerError::stock_not_found(&ticker))?;

        let volume = Volume::new(request.volume)?;
        let cost = stock.price.total(volume)?;

        let _guard = self.locks.acquire(account.id).await;

        let mut attempt = 0;
        let (transaction, new_balance) = loop {
            attempt += 1;
            let current = self
                .store
                .find_account_by_id(account.id)
                .await?
                .ok_or_else(|| LedgerError::user_not_found(&username))?;

            let new_balance = match request.transaction_type {
                TransactionType::BUY => current.balance.debit(cost),
                TransactionType::SELL => current.balance.credit(cost),
            };
            let new_balance = match new_balance {
                Ok(balance) => balance,
                Err(err) => {
                    warn!(
                        user_id = %account.id,
                        ticker = %stock.ticker,
                        side = %request.transaction_type,
                        volume = volume.get(),
                        cost = %cost,
                        balance = %current.balance,
                        error = %err,
                        "Settlement rejected"
                    );
                    return Err(err);
                }
            };

            let transaction = Transaction::new(
                account.id,
                stock.ticker.clone(),
                request.transaction_type,
                volume,
                stock.price,
                cost,
                Utc::now(),
            );

            let write = SettlementWrite {
                observed_balance: current.balance,
                new_balance,
                transaction: &transaction,
            };
            match self.store.settle(&write).await {
                Ok(()) => break (transaction, new_balance),
                Err(StoreError::Conflict(reason)) if attempt < MAX_SETTLE_ATTEMPTS => {
                    warn!(user_id = %account.id, attempt, %reason, "Balance moved underneath settlement, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        };

        info!(
            transaction_id = %transaction.id,
            user_id = %account.id,
            ticker = %transaction.ticker,
            side = %transaction.transaction_type,
            volume = volume.get(),
            amount = %cost,
            balance = %new_balance,
            "Settled"
        );

        Ok(SettlementReceipt {
            transaction,
            balance: new_balance,
        })
    }
}
