//! Application state.

use std::sync::Arc;

use coinshop_store::Store;

use crate::auth::TokenIssuer;
use crate::config::{ConfigError, ServiceConfig};
use crate::crypto::CredentialHasher;
use crate::history::HistoryReader;
use crate::ledger::Ledger;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<dyn Store>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// The ledger engine.
    pub ledger: Ledger,

    /// Profile reads.
    pub history: HistoryReader,

    /// Credential hashing.
    pub hasher: CredentialHasher,

    /// Bearer token signing.
    pub tokens: TokenIssuer,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the Argon2 cost parameters are
    /// unusable.
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Result<Self, ConfigError> {
        let hasher = CredentialHasher::new(
            config.password_hash_memory_kib,
            config.password_hash_iterations,
        )
        .map_err(|e| ConfigError::Invalid {
            name: "PASSWORD_HASH_MEMORY_KIB",
            value: format!(
                "{} KiB x {} ({e})",
                config.password_hash_memory_kib, config.password_hash_iterations
            ),
        })?;
        let tokens = TokenIssuer::new(&config.secret_key, config.token_ttl_seconds);

        let ledger = Ledger::new(store.clone(), config.ledger_timeout());
        let history = HistoryReader::new(store.clone());

        tracing::debug!(
            ledger_timeout_ms = config.ledger_timeout_ms,
            token_ttl_seconds = config.token_ttl_seconds,
            "Application state ready"
        );

        Ok(Self {
            store,
            config,
            ledger,
            history,
            hasher,
            tokens,
        })
    }
}
