//! Error types for coinshop storage.

use coinshop_core::{AccountId, LedgerError};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// The pool or connection could not be reached.
    #[error("database unavailable: {0}")]
    Unavailable(String),

    /// The unit of work lost a serialization race and was rolled back.
    #[error("serialization conflict: {0}")]
    Conflict(String),

    /// A check constraint rejected the write.
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// Schema migration failed.
    #[error("migration failed: {0}")]
    Migration(String),

    /// The conditional debit matched no row because the balance was too low.
    #[error("insufficient funds")]
    InsufficientFunds,

    /// Account row not found.
    #[error("account not found: {0}")]
    AccountNotFound(AccountId),

    /// No account with this username.
    #[error("recipient not found: {0}")]
    RecipientNotFound(String),

    /// No catalog item with this name.
    #[error("item not found: {0}")]
    ItemNotFound(String),

    /// Sender and recipient resolved to the same account.
    #[error("self transfer")]
    SelfTransfer,

    /// A debit amount that is zero, negative or not negatable.
    #[error("invalid amount: {0}")]
    InvalidAmount(i64),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        map_sqlx_error(err)
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Migration(err.to_string())
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InsufficientFunds => Self::InsufficientFunds,
            StoreError::AccountNotFound(id) => Self::AccountNotFound {
                account_id: id.to_string(),
            },
            StoreError::RecipientNotFound(username) => Self::RecipientNotFound { username },
            StoreError::ItemNotFound(name) => Self::ItemNotFound { name },
            StoreError::SelfTransfer => Self::SelfTransfer,
            StoreError::InvalidAmount(amount) => Self::InvalidAmount(amount),
            StoreError::Database(msg)
            | StoreError::Unavailable(msg)
            | StoreError::Conflict(msg)
            | StoreError::Constraint(msg)
            | StoreError::Migration(msg) => Self::StorageUnavailable(msg),
        }
    }
}

/// Map a sqlx error onto the store's error classes.
///
/// | Source | Class |
/// |--------|-------|
/// | SQLSTATE `40001` / `40P01`, SQLite `BUSY` / `LOCKED` | `Conflict` |
/// | check constraint violation | `Constraint` |
/// | pool timeout / closed, io, tls, crashed worker | `Unavailable` |
/// | anything else | `Database` |
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = db_err.message().to_string();

            if let Some(code) = db_err.code() {
                // 5 = SQLITE_BUSY, 6 = SQLITE_LOCKED, 517 = SQLITE_BUSY_SNAPSHOT
                if matches!(code.as_ref(), "40001" | "40P01" | "5" | "6" | "517") {
                    return StoreError::Conflict(msg);
                }
            }

            match db_err.kind() {
                sqlx::error::ErrorKind::CheckViolation => StoreError::Constraint(msg),
                _ => StoreError::Database(msg),
            }
        }
        sqlx::Error::PoolTimedOut => StoreError::Unavailable("connection pool timed out".into()),
        sqlx::Error::PoolClosed => StoreError::Unavailable("connection pool closed".into()),
        sqlx::Error::WorkerCrashed => StoreError::Unavailable("database worker crashed".into()),
        sqlx::Error::Io(e) => StoreError::Unavailable(e.to_string()),
        sqlx::Error::Tls(e) => StoreError::Unavailable(e.to_string()),
        other => StoreError::Database(other.to_string()),
    }
}
