//! Database schema definitions and backend selection.
//!
//! The logical schema is four relations:
//!
//! - `accounts`: one row per user, `balance >= 0` enforced by a check constraint
//! - `catalog_items`: item name to price, seeded by the initial migration
//! - `orders`: append-only purchase records
//! - `coin_transactions`: append-only transfer records
//!
//! Each backend has its own migration directory because the DDL dialects
//! differ (`BIGSERIAL` versus `INTEGER PRIMARY KEY`). Every statement the
//! store issues at runtime is shared between them.

use sqlx::migrate::Migrator;

/// PostgreSQL migrations, embedded at compile time.
static POSTGRES_MIGRATIONS: Migrator = sqlx::migrate!("./migrations/postgres");

/// SQLite migrations, embedded at compile time.
static SQLITE_MIGRATIONS: Migrator = sqlx::migrate!("./migrations/sqlite");

/// Which database engine a connection URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// PostgreSQL (`postgres://` or `postgresql://`).
    Postgres,
    /// SQLite (`sqlite:`), file-backed or in-memory.
    Sqlite,
}

impl Backend {
    /// Detect the backend from a connection URL.
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Some(Self::Postgres)
        } else if url.starts_with("sqlite:") {
            Some(Self::Sqlite)
        } else {
            None
        }
    }

    /// The embedded migrator for this backend.
    #[must_use]
    pub fn migrator(self) -> &'static Migrator {
        match self {
            Self::Postgres => &POSTGRES_MIGRATIONS,
            Self::Sqlite => &SQLITE_MIGRATIONS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_backend_from_url() {
        assert_eq!(
            Backend::from_url("postgres://u:p@localhost/shop"),
            Some(Backend::Postgres)
        );
        assert_eq!(
            Backend::from_url("postgresql://localhost/shop"),
            Some(Backend::Postgres)
        );
        assert_eq!(Backend::from_url("sqlite::memory:"), Some(Backend::Sqlite));
        assert_eq!(
            Backend::from_url("sqlite://coinshop.db?mode=rwc"),
            Some(Backend::Sqlite)
        );
        assert_eq!(Backend::from_url("mysql://localhost/shop"), None);
    }

    #[test]
    fn each_backend_has_one_initial_migration() {
        assert_eq!(Backend::Postgres.migrator().iter().count(), 1);
        assert_eq!(Backend::Sqlite.migrator().iter().count(), 1);
    }
}
