//! Client error types.

/// Errors that can occur when using the coinshop client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error response without a more specific variant.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// The debited account cannot cover the amount.
    #[error("insufficient funds")]
    InsufficientFunds,

    /// Transfer recipient does not exist.
    #[error("{0}")]
    RecipientNotFound(String),

    /// Catalog item does not exist.
    #[error("{0}")]
    ItemNotFound(String),

    /// Token missing, invalid or expired, or wrong password.
    #[error("unauthorized")]
    Unauthorized,

    /// The server's storage did not confirm the request.
    ///
    /// For `send_coin` and `buy` the coins may or may not have moved; call
    /// `info` before re-sending.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Whether the server may have applied the request despite the error.
    ///
    /// Read-only calls can simply be repeated. A `send_coin` or `buy` that
    /// fails this way must be reconciled against `info` first.
    #[must_use]
    pub const fn is_outcome_unknown(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }
}
