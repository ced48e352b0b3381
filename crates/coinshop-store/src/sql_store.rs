//! SQL storage implementation over the `sqlx` `Any` driver.
//!
//! This module provides `SqlStore`, which implements every store trait for
//! both PostgreSQL and SQLite.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use sqlx::any::AnyPoolOptions;
use sqlx::{Any, AnyConnection, AnyPool, FromRow, Transaction};

use coinshop_core::{
    Account, AccountId, CatalogItem, CoinTransaction, Direction, Holding, ItemId, Order, OrderId,
    TransactionId, TransferEntry, STARTING_BALANCE,
};

use crate::error::{Result, StoreError};
use crate::schema::Backend;
use crate::sql;
use crate::{AccountStore, CatalogStore, HistoryStore, LedgerStore};

/// Minimum number of times a unit of work is re-run after a serialization
/// conflict. PostgreSQL pools raise the budget to twice their connection
/// count, since every lost race means another unit on the same rows committed.
pub const SERIALIZATION_RETRIES: u32 = 8;

/// Upper bound of the first backoff window; doubles per attempt.
const BACKOFF_BASE: Duration = Duration::from_millis(2);

/// Largest backoff window between two attempts.
const BACKOFF_CAP: Duration = Duration::from_millis(64);

/// Pool settings for `SqlStore::connect`.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Maximum pooled connections. SQLite always uses one.
    pub max_connections: u32,

    /// How long to wait for a free connection.
    pub acquire_timeout: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// SQL-backed storage.
#[derive(Debug, Clone)]
pub struct SqlStore {
    pool: AnyPool,
    backend: Backend,
    retry_budget: u32,
}

// ============================================================================
// Row mapping
// ============================================================================

#[derive(FromRow)]
struct AccountRow {
    id: i64,
    username: String,
    credential_hash: String,
    balance: i64,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: AccountId::new(row.id),
            username: row.username,
            credential_hash: row.credential_hash,
            balance: row.balance,
        }
    }
}

#[derive(FromRow)]
struct ItemRow {
    id: i64,
    name: String,
    price: i64,
}

impl From<ItemRow> for CatalogItem {
    fn from(row: ItemRow) -> Self {
        Self {
            id: ItemId::new(row.id),
            name: row.name,
            price: row.price,
        }
    }
}

#[derive(FromRow)]
struct HoldingRow {
    item: String,
    quantity: i64,
}

#[derive(FromRow)]
struct TransferRow {
    id: i64,
    sender_id: i64,
    recipient_id: i64,
    amount: i64,
    sender_name: String,
    recipient_name: String,
}

impl TransferRow {
    fn into_entry(self, account: AccountId) -> Option<TransferEntry> {
        let tx = CoinTransaction {
            id: TransactionId::new(self.id),
            sender_id: AccountId::new(self.sender_id),
            recipient_id: AccountId::new(self.recipient_id),
            amount: self.amount,
        };

        let direction = tx.direction_for(account)?;
        let counterparty = match direction {
            Direction::Received => self.sender_name,
            Direction::Sent => self.recipient_name,
        };

        Some(TransferEntry {
            id: tx.id,
            direction,
            counterparty,
            amount: tx.amount,
        })
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

impl SqlStore {
    /// Connect to the database at `url`.
    ///
    /// SQLite pools are pinned to a single long-lived connection, which both
    /// serializes writers and keeps `sqlite::memory:` databases alive.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL scheme is unsupported or the database
    /// cannot be reached.
    pub async fn connect(url: &str, options: &ConnectOptions) -> Result<Self> {
        let backend = Backend::from_url(url).ok_or_else(|| {
            let scheme = url.split(':').next().unwrap_or_default();
            StoreError::Unavailable(format!("unsupported database scheme: {scheme}"))
        })?;

        sqlx::any::install_default_drivers();

        let pool_options = AnyPoolOptions::new().acquire_timeout(options.acquire_timeout);
        let (pool_options, retry_budget) = match backend {
            Backend::Postgres => (
                pool_options.max_connections(options.max_connections),
                options
                    .max_connections
                    .saturating_mul(2)
                    .max(SERIALIZATION_RETRIES),
            ),
            Backend::Sqlite => (
                pool_options
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None),
                SERIALIZATION_RETRIES,
            ),
        };

        let pool = pool_options.connect(url).await?;

        tracing::info!(?backend, retry_budget, "Connected to database");

        Ok(Self {
            pool,
            backend,
            retry_budget,
        })
    }

    /// Open a fresh, migrated in-memory SQLite store.
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite cannot be opened or migrated.
    pub async fn in_memory() -> Result<Self> {
        let store = Self::connect("sqlite::memory:", &ConnectOptions::default()).await?;
        store.migrate().await?;
        Ok(store)
    }

    /// Apply any pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Migration` if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        self.backend.migrator().run(&self.pool).await?;
        tracing::debug!(backend = ?self.backend, "Migrations applied");
        Ok(())
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Which database engine this store talks to.
    #[must_use]
    pub fn backend(&self) -> Backend {
        self.backend
    }

    // ========================================================================
    // Units of work
    // ========================================================================

    /// Begin a unit of work at the backend's isolation level.
    ///
    /// Dropping the returned transaction without committing rolls it back,
    /// so an early `?` return leaves no writes behind.
    async fn begin(&self) -> Result<Transaction<'static, Any>> {
        let mut tx = self.pool.begin().await?;
        if self.backend == Backend::Postgres {
            sqlx::query(sql::REPEATABLE_READ).execute(&mut *tx).await?;
        }
        Ok(tx)
    }

    /// Run `unit` until it commits, fails for a business reason, or loses
    /// more serialization races than the retry budget allows.
    ///
    /// Only `Conflict` is retried. PostgreSQL raises it before COMMIT
    /// succeeds, so the failed attempt left nothing behind.
    async fn with_retry<T, F, Fut>(&self, operation: &'static str, mut unit: F) -> Result<T>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
    {
        let mut attempt = 0;
        loop {
            match unit().await {
                Err(StoreError::Conflict(msg)) if attempt < self.retry_budget => {
                    attempt += 1;
                    let delay = backoff(attempt);
                    tracing::debug!(
                        operation,
                        attempt,
                        delay_us = u64::try_from(delay.as_micros()).unwrap_or(u64::MAX),
                        error = %msg,
                        "Retrying after serialization conflict"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(StoreError::Conflict(msg)) => {
                    tracing::warn!(operation, attempts = attempt + 1, "Serialization retries exhausted");
                    return Err(StoreError::Unavailable(format!(
                        "{operation} kept conflicting: {msg}"
                    )));
                }
                other => return other,
            }
        }
    }

    async fn transfer_once(
        &self,
        sender: AccountId,
        recipient_username: &str,
        amount: i64,
    ) -> Result<CoinTransaction> {
        let mut tx = self.begin().await?;

        let recipient = sqlx::query_scalar::<_, i64>(sql::SELECT_ACCOUNT_ID_BY_USERNAME)
            .bind(recipient_username)
            .fetch_optional(&mut *tx)
            .await?
            .map(AccountId::new)
            .ok_or_else(|| StoreError::RecipientNotFound(recipient_username.to_string()))?;

        if recipient == sender {
            return Err(StoreError::SelfTransfer);
        }

        debit(&mut tx, sender, amount).await?;

        if conditional_adjust(&mut tx, recipient, amount, 0).await? == 0 {
            return Err(StoreError::AccountNotFound(recipient));
        }

        let id = sqlx::query_scalar::<_, i64>(sql::INSERT_COIN_TRANSACTION)
            .bind(sender.get())
            .bind(recipient.get())
            .bind(amount)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(CoinTransaction {
            id: TransactionId::new(id),
            sender_id: sender,
            recipient_id: recipient,
            amount,
        })
    }

    async fn purchase_once(&self, buyer: AccountId, item_name: &str) -> Result<Order> {
        let mut tx = self.begin().await?;

        let item: CatalogItem = sqlx::query_as::<_, ItemRow>(sql::SELECT_ITEM_BY_NAME)
            .bind(item_name)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::ItemNotFound(item_name.to_string()))?
            .into();

        debit(&mut tx, buyer, item.price).await?;

        let id = sqlx::query_scalar::<_, i64>(sql::INSERT_ORDER)
            .bind(buyer.get())
            .bind(item.id.get())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Order {
            id: OrderId::new(id),
            owner_id: buyer,
            item_id: item.id,
        })
    }
}

/// Random delay of at most `min(BACKOFF_BASE * 2^attempt, BACKOFF_CAP)`, so
/// units that lost the same race do not collide again in lockstep.
fn backoff(attempt: u32) -> Duration {
    let window = BACKOFF_BASE
        .saturating_mul(1 << attempt.min(8))
        .min(BACKOFF_CAP);
    let window_us = u64::try_from(window.as_micros()).unwrap_or(u64::MAX);

    Duration::from_micros(rand::thread_rng().gen_range(0..=window_us))
}

/// Apply the conditional adjust on an open connection and report rows changed.
async fn conditional_adjust(
    conn: &mut AnyConnection,
    id: AccountId,
    delta: i64,
    min_resulting_balance: i64,
) -> Result<u64> {
    let result = sqlx::query(sql::CONDITIONAL_ADJUST)
        .bind(delta)
        .bind(id.get())
        .bind(min_resulting_balance)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

/// Take `amount` from `id` without letting the balance go negative.
async fn debit(conn: &mut AnyConnection, id: AccountId, amount: i64) -> Result<()> {
    let delta = amount
        .checked_neg()
        .filter(|delta| *delta < 0)
        .ok_or(StoreError::InvalidAmount(amount))?;

    let changed = conditional_adjust(&mut *conn, id, delta, 0)
        .await
        .map_err(|err| match err {
            StoreError::Constraint(_) => StoreError::InsufficientFunds,
            other => other,
        })?;

    if changed == 0 {
        let exists = sqlx::query_scalar::<_, i64>(sql::SELECT_ACCOUNT_ID)
            .bind(id.get())
            .fetch_optional(&mut *conn)
            .await?
            .is_some();

        return Err(if exists {
            StoreError::InsufficientFunds
        } else {
            StoreError::AccountNotFound(id)
        });
    }

    Ok(())
}

// ============================================================================
// Trait implementations
// ============================================================================

#[async_trait]
impl AccountStore for SqlStore {
    async fn create_or_fetch(
        &self,
        username: &str,
        credential_hash: &str,
    ) -> Result<(Account, bool)> {
        let inserted = sqlx::query_as::<_, AccountRow>(sql::INSERT_ACCOUNT_IF_ABSENT)
            .bind(username)
            .bind(credential_hash)
            .bind(STARTING_BALANCE)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = inserted {
            tracing::info!(account_id = row.id, username, "Account created");
            return Ok((row.into(), true));
        }

        let existing = self.account_by_username(username).await?.ok_or_else(|| {
            StoreError::Database(format!("account {username} missing after insert conflict"))
        })?;

        Ok((existing, false))
    }

    async fn account_by_id(&self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(sql::SELECT_ACCOUNT_BY_ID)
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn account_by_username(&self, username: &str) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(sql::SELECT_ACCOUNT_BY_USERNAME)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn adjust_balance(
        &self,
        id: AccountId,
        delta: i64,
        min_resulting_balance: i64,
    ) -> Result<u64> {
        let mut conn = self.pool.acquire().await?;
        conditional_adjust(&mut conn, id, delta, min_resulting_balance).await
    }
}

#[async_trait]
impl CatalogStore for SqlStore {
    async fn item_by_name(&self, name: &str) -> Result<Option<CatalogItem>> {
        let row = sqlx::query_as::<_, ItemRow>(sql::SELECT_ITEM_BY_NAME)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn list_items(&self) -> Result<Vec<CatalogItem>> {
        let rows = sqlx::query_as::<_, ItemRow>(sql::SELECT_ITEMS)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl LedgerStore for SqlStore {
    async fn transfer(
        &self,
        sender: AccountId,
        recipient_username: &str,
        amount: i64,
    ) -> Result<CoinTransaction> {
        let tx = self
            .with_retry("transfer", move || {
                self.transfer_once(sender, recipient_username, amount)
            })
            .await?;

        tracing::debug!(
            transaction_id = tx.id.get(),
            sender = sender.get(),
            recipient = tx.recipient_id.get(),
            amount,
            "Transfer committed"
        );

        Ok(tx)
    }

    async fn purchase(&self, buyer: AccountId, item_name: &str) -> Result<Order> {
        let order = self
            .with_retry("purchase", move || self.purchase_once(buyer, item_name))
            .await?;

        tracing::debug!(
            order_id = order.id.get(),
            buyer = buyer.get(),
            item = item_name,
            "Purchase committed"
        );

        Ok(order)
    }
}

#[async_trait]
impl HistoryStore for SqlStore {
    async fn holdings(&self, account: AccountId) -> Result<Vec<Holding>> {
        let rows = sqlx::query_as::<_, HoldingRow>(sql::SELECT_HOLDINGS)
            .bind(account.get())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Holding {
                item: row.item,
                quantity: row.quantity,
            })
            .collect())
    }

    async fn transfers(&self, account: AccountId) -> Result<Vec<TransferEntry>> {
        let rows = sqlx::query_as::<_, TransferRow>(sql::SELECT_TRANSFERS)
            .bind(account.get())
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| row.into_entry(account))
            .collect())
    }
}
