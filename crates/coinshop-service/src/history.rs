//! Profile snapshots.

use std::sync::Arc;

use coinshop_core::{AccountId, LedgerError, Profile};
use coinshop_store::Store;

/// Read-only view over an account's balance, inventory and transfers.
#[derive(Clone)]
pub struct HistoryReader {
    store: Arc<dyn Store>,
}

impl HistoryReader {
    /// Create a reader over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Build the point-in-time profile for `account`.
    ///
    /// The three reads are not one unit of work; a concurrent commit may be
    /// reflected in some parts and not others.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the ID does not resolve, or
    /// `StorageUnavailable` on backend failure.
    pub async fn profile(&self, account: AccountId) -> Result<Profile, LedgerError> {
        let balance = self
            .store
            .account_by_id(account)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound {
                account_id: account.to_string(),
            })?
            .balance;

        let holdings = self.store.holdings(account).await?;
        let entries = self.store.transfers(account).await?;

        tracing::debug!(
            account_id = %account,
            items = holdings.len(),
            transfers = entries.len(),
            "Profile assembled"
        );

        Ok(Profile::assemble(balance, holdings, entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinshop_store::{AccountStore, LedgerStore, SqlStore};

    #[tokio::test]
    async fn profile_reflects_purchases_and_transfers() {
        let store = Arc::new(SqlStore::in_memory().await.unwrap());
        let (alice, _) = store.create_or_fetch("alice", "salt$mac").await.unwrap();
        let (bob, _) = store.create_or_fetch("bob", "salt$mac").await.unwrap();

        store.purchase(alice.id, "pen").await.unwrap();
        store.purchase(alice.id, "cup").await.unwrap();
        store.purchase(alice.id, "pen").await.unwrap();
        store.transfer(alice.id, "bob", 30).await.unwrap();
        store.transfer(bob.id, "alice", 5).await.unwrap();

        let reader = HistoryReader::new(store.clone());
        let profile = reader.profile(alice.id).await.unwrap();

        assert_eq!(profile.coins, alice.balance - 10 - 20 - 10 - 30 + 5);
        assert_eq!(profile.inventory.len(), 2);
        assert_eq!(profile.inventory[0].item_type, "cup");
        assert_eq!(profile.inventory[1].item_type, "pen");
        assert_eq!(profile.inventory[1].quantity, 2);
        assert_eq!(profile.coin_history.sent.len(), 1);
        assert_eq!(profile.coin_history.sent[0].to_user, "bob");
        assert_eq!(profile.coin_history.received[0].from_user, "bob");
        assert_eq!(profile.coin_history.received[0].amount, 5);
    }

    #[tokio::test]
    async fn repeated_reads_are_identical() {
        let store = Arc::new(SqlStore::in_memory().await.unwrap());
        let (alice, _) = store.create_or_fetch("alice", "salt$mac").await.unwrap();
        store.purchase(alice.id, "book").await.unwrap();

        let reader = HistoryReader::new(store);
        let first = reader.profile(alice.id).await.unwrap();
        let second = reader.profile(alice.id).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn unknown_account_is_account_not_found() {
        let reader = HistoryReader::new(Arc::new(SqlStore::in_memory().await.unwrap()));

        let err = reader.profile(AccountId::new(404)).await.unwrap_err();
        assert!(matches!(err, LedgerError::AccountNotFound { .. }));
    }
}
