//! The ledger engine.
//!
//! `Ledger` is the only component that moves coins. It re-validates amounts,
//! bounds every store call with a timeout, and logs each outcome. All mutual
//! exclusion lives in the store's units of work; the engine holds no locks and
//! never retries.
//!
//! A call that times out is reported as `StorageUnavailable` with an unknown
//! outcome: the unit may have committed just before the deadline.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use coinshop_core::{AccountId, CoinTransaction, LedgerError, Order, MAX_COINS};
use coinshop_store::{Store, StoreError};

/// Coordinates transfers and purchases against the store.
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn Store>,
    timeout: Duration,
}

impl Ledger {
    /// Create an engine over `store` with a per-call `timeout`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Move `amount` coins from `sender` to `recipient_username`.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` unless `1 <= amount <= MAX_COINS`
    /// - `RecipientNotFound`, `SelfTransfer`, `InsufficientFunds` as decided
    ///   inside the unit of work
    /// - `AccountNotFound` if `sender` has no row
    /// - `StorageUnavailable` on backend failure or timeout
    pub async fn transfer(
        &self,
        sender: AccountId,
        recipient_username: &str,
        amount: i64,
    ) -> Result<CoinTransaction, LedgerError> {
        if amount <= 0 || amount > MAX_COINS {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let outcome = self
            .bounded(self.store.transfer(sender, recipient_username, amount))
            .await;

        match &outcome {
            Ok(tx) => tracing::info!(
                transaction_id = %tx.id,
                sender = %sender,
                recipient = %tx.recipient_id,
                amount,
                "Transfer committed"
            ),
            Err(e) => log_failure("transfer", sender, e),
        }

        outcome
    }

    /// Buy one `item_name` for `buyer`.
    ///
    /// # Errors
    ///
    /// - `ItemNotFound` if the catalog has no such item
    /// - `InsufficientFunds` if the buyer cannot afford it
    /// - `AccountNotFound` if `buyer` has no row
    /// - `StorageUnavailable` on backend failure or timeout
    pub async fn purchase(&self, buyer: AccountId, item_name: &str) -> Result<Order, LedgerError> {
        let outcome = self.bounded(self.store.purchase(buyer, item_name)).await;

        match &outcome {
            Ok(order) => tracing::info!(
                order_id = %order.id,
                buyer = %buyer,
                item = %item_name,
                "Purchase committed"
            ),
            Err(e) => log_failure("purchase", buyer, e),
        }

        outcome
    }

    /// Await `call` for at most the configured timeout.
    ///
    /// Dropping a call that has not reached COMMIT rolls its unit of work
    /// back. Once COMMIT is in flight the unit may already be durable, so a
    /// timeout does not say whether coins moved.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, LedgerError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(LedgerError::from),
            Err(_) => Err(LedgerError::StorageUnavailable(format!(
                "ledger call exceeded {} ms",
                self.timeout.as_millis()
            ))),
        }
    }
}

fn log_failure(operation: &'static str, account: AccountId, err: &LedgerError) {
    if err.is_storage_failure() {
        tracing::error!(
            operation,
            account_id = %account,
            error = %err,
            "Ledger call failed; outcome unknown"
        );
    } else {
        tracing::info!(operation, account_id = %account, reason = %err, "Ledger call rejected");
    }
}
