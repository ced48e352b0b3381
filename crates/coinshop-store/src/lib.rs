//! SQL storage layer for coinshop.
//!
//! This crate owns the ledger's durable state and the units of work that
//! change it. Every mutating operation runs inside one database transaction:
//! either all of its writes commit or none do.
//!
//! # Backends
//!
//! - **PostgreSQL**: units run at `REPEATABLE READ`. A unit that loses a
//!   serialization race is re-run after a jittered backoff, up to a budget of
//!   twice the pool size.
//! - **SQLite**: a single pooled connection serializes all units. Used for
//!   local runs and tests, file-backed or in-memory.
//!
//! # Example
//!
//! ```no_run
//! use coinshop_store::{AccountStore, LedgerStore, SqlStore};
//!
//! # async fn demo() -> coinshop_store::Result<()> {
//! let store = SqlStore::in_memory().await?;
//!
//! let (alice, _) = store.create_or_fetch("alice", "hash").await?;
//! store.create_or_fetch("bob", "hash").await?;
//!
//! store.transfer(alice.id, "bob", 100).await?;
//! store.purchase(alice.id, "cup").await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod schema;
mod sql;
pub mod sql_store;

pub use error::{Result, StoreError};
pub use schema::Backend;
pub use sql_store::{ConnectOptions, SqlStore, SERIALIZATION_RETRIES};

use async_trait::async_trait;
use coinshop_core::{
    Account, AccountId, CatalogItem, CoinTransaction, Holding, Order, TransferEntry,
};

/// Account records and the conditional balance primitive.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert an account with the starting balance, or fetch the existing one.
    ///
    /// Returns the account and `true` when this call created it. Two racing
    /// first logins for one username yield exactly one row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn create_or_fetch(
        &self,
        username: &str,
        credential_hash: &str,
    ) -> Result<(Account, bool)>;

    /// Get an account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn account_by_id(&self, id: AccountId) -> Result<Option<Account>>;

    /// Get an account by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn account_by_username(&self, username: &str) -> Result<Option<Account>>;

    /// Add `delta` to the balance only if the result stays at or above
    /// `min_resulting_balance`.
    ///
    /// Returns the number of rows changed: `1` when applied, `0` when the
    /// condition did not hold or the account does not exist. Runs as its own
    /// single-statement unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn adjust_balance(
        &self,
        id: AccountId,
        delta: i64,
        min_resulting_balance: i64,
    ) -> Result<u64>;
}

/// Read access to the item catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Look up an item by exact name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn item_by_name(&self, name: &str) -> Result<Option<CatalogItem>>;

    /// All items, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_items(&self) -> Result<Vec<CatalogItem>>;
}

/// The two atomic units of work.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Move `amount` coins from `sender` to the account named
    /// `recipient_username` and record the transfer.
    ///
    /// # Errors
    ///
    /// - `StoreError::RecipientNotFound` if no account has that username
    /// - `StoreError::SelfTransfer` if the recipient is the sender
    /// - `StoreError::InsufficientFunds` if the sender's balance is below `amount`
    /// - `StoreError::AccountNotFound` if the sender row is missing
    ///
    /// No write survives any of these.
    async fn transfer(
        &self,
        sender: AccountId,
        recipient_username: &str,
        amount: i64,
    ) -> Result<CoinTransaction>;

    /// Debit the price of `item_name` from `buyer` and record one order.
    ///
    /// # Errors
    ///
    /// - `StoreError::ItemNotFound` if the catalog has no such item
    /// - `StoreError::InsufficientFunds` if the buyer cannot afford it
    /// - `StoreError::AccountNotFound` if the buyer row is missing
    async fn purchase(&self, buyer: AccountId, item_name: &str) -> Result<Order>;
}

/// Per-account history queries.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Purchased items grouped by name with counts, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn holdings(&self, account: AccountId) -> Result<Vec<Holding>>;

    /// Every transfer the account took part in, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn transfers(&self, account: AccountId) -> Result<Vec<TransferEntry>>;
}

/// Everything the service needs from storage.
pub trait Store: AccountStore + CatalogStore + LedgerStore + HistoryStore {}

impl<T> Store for T where T: AccountStore + CatalogStore + LedgerStore + HistoryStore {}
