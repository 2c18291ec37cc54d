//! Per-account mutual exclusion
//!
//! A settlement holds its account's lock from the balance read until the
//! store commit, so two requests for one account cannot both pass the
//! funds check against the same balance. Requests for different accounts
//! never wait on each other here.
//!
//! An entry lives only while some request holds or waits for it; the last
//! guard to drop removes it, so the map stays as small as the number of
//! accounts currently settling.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use types::ids::UserId;

#[derive(Debug, Default)]
pub struct AccountLocks {
    locks: DashMap<UserId, Arc<Mutex<()>>>,
}

/// Exclusive access to one account; released on drop
#[derive(Debug)]
pub struct AccountGuard<'a> {
    guard: Option<OwnedMutexGuard<()>>,
    locks: &'a AccountLocks,
    account: UserId,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `account`
    pub async fn acquire(&self, account: UserId) -> AccountGuard<'_> {
        // Clone the Arc out so the map shard is not held across the await
        let lock = self.locks.entry(account).or_default().clone();
        let guard = lock.lock_owned().await;
        AccountGuard {
            guard: Some(guard),
            locks: self,
            account,
        }
    }

    /// Accounts with a holder or waiter right now
    pub fn tracked_accounts(&self) -> usize {
        self.locks.len()
    }
}

impl Drop for AccountGuard<'_> {
    fn drop(&mut self) {
        // Release first so our own reference no longer counts.
        drop(self.guard.take());
        // Under the shard lock nobody can clone the Arc concurrently; a count
        // of one means only the map still refers to it.
        self.locks
            .locks
            .remove_if(&self.account, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_account_is_exclusive() {
        let locks = Arc::new(AccountLocks::new());
        let account = UserId::new();

        let guard = locks.acquire(account).await;
        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _g = locks.acquire(account).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished(), "second acquire must wait");

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_accounts_do_not_block() {
        let locks = AccountLocks::new();
        let _a = locks.acquire(UserId::new()).await;
        let _b = tokio::time::timeout(Duration::from_millis(50), locks.acquire(UserId::new()))
            .await
            .expect("independent account must not wait");
        assert_eq!(locks.tracked_accounts(), 2);
    }

    #[tokio::test]
    async fn test_entry_removed_after_last_release() {
        let locks = AccountLocks::new();
        let account = UserId::new();

        let guard = locks.acquire(account).await;
        assert_eq!(locks.tracked_accounts(), 1);
        drop(guard);
        assert_eq!(locks.tracked_accounts(), 0);

        // Reacquiring after pruning still works
        let _again = locks.acquire(account).await;
        assert_eq!(locks.tracked_accounts(), 1);
    }

    #[tokio::test]
    async fn test_entry_kept_while_someone_waits() {
        let locks = Arc::new(AccountLocks::new());
        let account = UserId::new();

        let guard = locks.acquire(account).await;
        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _g = locks.acquire(account).await;
                tokio::time::sleep(Duration::from_millis(10)).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(guard);
        assert_eq!(locks.tracked_accounts(), 1, "waiter still references the lock");

        waiter.await.unwrap();
        assert_eq!(locks.tracked_accounts(), 0);
    }
}
