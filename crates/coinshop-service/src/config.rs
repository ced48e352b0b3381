//! Service configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default SQLite database, created next to the binary on first start.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://coinshop.db?mode=rwc";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set but does not parse.
    #[error("invalid value for {name}: {value:?}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Service configuration loaded from environment variables.
#[derive(Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Database URL; the scheme selects PostgreSQL or SQLite.
    pub database_url: String,

    /// Pool size for PostgreSQL (default: 10).
    pub database_max_connections: u32,

    /// Secret keying token signatures.
    pub secret_key: String,

    /// Argon2 memory cost per credential hash, in KiB (default: 19456).
    pub password_hash_memory_kib: u32,

    /// Argon2 passes per credential hash (default: 2).
    pub password_hash_iterations: u32,

    /// Token lifetime in seconds (default: one day).
    pub token_ttl_seconds: u64,

    /// Upper bound on a single ledger call in milliseconds (default: 4000).
    pub ledger_timeout_ms: u64,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` when `SECRET_KEY` is unset and
    /// `ConfigError::Invalid` when a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let secret_key = std::env::var("SECRET_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("SECRET_KEY"))?;

        Ok(Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            database_max_connections: parse_var(
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            )?,
            secret_key,
            password_hash_memory_kib: parse_var(
                "PASSWORD_HASH_MEMORY_KIB",
                defaults.password_hash_memory_kib,
            )?,
            password_hash_iterations: parse_var(
                "PASSWORD_HASH_ITERATIONS",
                defaults.password_hash_iterations,
            )?,
            token_ttl_seconds: parse_var("TOKEN_TTL_SECONDS", defaults.token_ttl_seconds)?,
            ledger_timeout_ms: parse_var("LEDGER_TIMEOUT_MS", defaults.ledger_timeout_ms)?,
            request_timeout_seconds: parse_var(
                "REQUEST_TIMEOUT_SECONDS",
                defaults.request_timeout_seconds,
            )?,
            max_body_bytes: parse_var("MAX_BODY_BYTES", defaults.max_body_bytes)?,
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| split_origins(&s))
                .unwrap_or(defaults.cors_origins),
        })
    }

    /// The per-call ledger timeout.
    #[must_use]
    pub fn ledger_timeout(&self) -> Duration {
        Duration::from_millis(self.ledger_timeout_ms)
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

fn split_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("listen_addr", &self.listen_addr)
            .field("database_max_connections", &self.database_max_connections)
            .field("password_hash_memory_kib", &self.password_hash_memory_kib)
            .field("password_hash_iterations", &self.password_hash_iterations)
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("ledger_timeout_ms", &self.ledger_timeout_ms)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("cors_origins", &self.cors_origins)
            .finish_non_exhaustive()
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            database_url: DEFAULT_DATABASE_URL.into(),
            database_max_connections: 10,
            secret_key: String::new(),
            password_hash_memory_kib: 19_456,
            password_hash_iterations: 2,
            token_ttl_seconds: 86_400,
            ledger_timeout_ms: 4_000,
            request_timeout_seconds: 30,
            max_body_bytes: 1024 * 1024,
            cors_origins: vec!["*".into()],
        }
    }
}
