//! Account Service

use persistence::{LedgerStore, StoreError};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use types::account::{normalize_username, Account};
use types::errors::{LedgerError, LedgerResult};
use types::ids::UserId;
use types::numeric::Money;

#[derive(Debug, Clone)]
pub struct AccountService {
    store: Arc<LedgerStore>,
}

impl AccountService {
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    /// Register a trading account with an opening balance
    pub async fn create_account(&self, username: &str, initial_balance: Decimal) -> LedgerResult<UserId> {
        let username = normalize_username(username)?;
        let balance = Money::new(initial_balance)?;
        let account = Account::new(username, balance);

        match self.store.insert_account(&account).await {
            Ok(()) => {}
            Err(StoreError::UniqueViolation(_)) => {
                return Err(LedgerError::DuplicateUser {
                    username: account.username,
                });
            }
            Err(err) => return Err(err.into()),
        }

        info!(user_id = %account.id, username = %account.username, balance = %balance, "Account created");
        Ok(account.id)
    }

    /// Case-insensitive lookup
    pub async fn get_account(&self, username: &str) -> LedgerResult<Account> {
        let username = normalize_username(username)?;
        self.store
            .find_account_by_username(&username)
            .await?
            .ok_or_else(|| LedgerError::user_not_found(username))
    }
}
