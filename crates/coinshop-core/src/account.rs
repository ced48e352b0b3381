//! Account and catalog types for coinshop.
//!
//! This module defines the two pieces of shared mutable state the ledger works
//! against: user accounts holding a coin balance, and catalog items with a price.

use serde::{Deserialize, Serialize};

use crate::{AccountId, ItemId};

// ============================================================================
// Constants
// ============================================================================

/// Coins granted to an account when it is first created.
pub const STARTING_BALANCE: i64 = 10_000_000;

/// Upper bound on a catalog price or a single transfer amount.
pub const MAX_COINS: i64 = 100_000_000;

/// A user account.
///
/// The balance is never negative; the store enforces this with a check
/// constraint and every debit is a conditioned update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Store-assigned account ID.
    pub id: AccountId,

    /// Unique login name.
    pub username: String,

    /// Argon2id PHC digest, never the plain password.
    #[serde(skip_serializing)]
    pub credential_hash: String,

    /// Current coin balance.
    pub balance: i64,
}

/// A purchasable catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Store-assigned item ID.
    pub id: ItemId,

    /// Unique item name, e.g. `"cup"`.
    pub name: String,

    /// Price in coins (always positive).
    pub price: i64,
}
