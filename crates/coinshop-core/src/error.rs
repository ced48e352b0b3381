//! Error types for coinshop.

/// The closed set of outcomes a ledger operation can fail with.
///
/// Callers branch on the variant, never on the message text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The debited account does not hold enough coins.
    #[error("insufficient funds")]
    InsufficientFunds,

    /// No account with the requested recipient username exists.
    #[error("recipient not found: {username}")]
    RecipientNotFound {
        /// The username that did not resolve.
        username: String,
    },

    /// No catalog item with the requested name exists.
    #[error("item not found: {name}")]
    ItemNotFound {
        /// The item name that did not resolve.
        name: String,
    },

    /// An authenticated account id did not resolve to a row.
    #[error("account not found: {account_id}")]
    AccountNotFound {
        /// The account ID that was not found.
        account_id: String,
    },

    /// Transfer amount is not in `1..=MAX_COINS`.
    #[error("invalid amount: {0}")]
    InvalidAmount(i64),

    /// Sender and recipient are the same account.
    #[error("cannot transfer coins to yourself")]
    SelfTransfer,

    /// The store did not confirm the unit of work (connectivity, commit
    /// failure, timeout).
    ///
    /// The outcome is unknown: a timeout or a failure during COMMIT can
    /// arrive after the unit was applied. Re-read the profile before issuing
    /// the transfer or purchase again.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl LedgerError {
    /// Whether the failure came from the storage layer rather than a
    /// definite business answer.
    ///
    /// Every other variant guarantees nothing was applied. A storage failure
    /// makes no such promise, so it is not a signal to blindly re-issue a
    /// money-moving request.
    #[must_use]
    pub const fn is_storage_failure(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }
}
