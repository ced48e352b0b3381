//! Append-only ledger records.
//!
//! Orders and coin transactions are facts: once written they are never updated
//! or deleted. Both carry store-assigned serial ids, so ordering by id is
//! ordering by creation.

use serde::{Deserialize, Serialize};

use crate::{AccountId, ItemId, OrderId, TransactionId};

/// A single purchase of one catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order ID.
    pub id: OrderId,

    /// The buyer.
    pub owner_id: AccountId,

    /// The purchased item.
    pub item_id: ItemId,
}

/// A coin transfer between two accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinTransaction {
    /// Transaction ID.
    pub id: TransactionId,

    /// Account that was debited.
    pub sender_id: AccountId,

    /// Account that was credited.
    pub recipient_id: AccountId,

    /// Coins moved (always positive).
    pub amount: i64,
}

impl CoinTransaction {
    /// Which side of the transfer `account` was on, if either.
    #[must_use]
    pub fn direction_for(&self, account: AccountId) -> Option<Direction> {
        if self.recipient_id == account {
            Some(Direction::Received)
        } else if self.sender_id == account {
            Some(Direction::Sent)
        } else {
            None
        }
    }
}

/// Direction of a transfer relative to one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The account was the recipient.
    Received,
    /// The account was the sender.
    Sent,
}

/// A coin transaction as seen from one account, with the counterparty resolved
/// to a username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEntry {
    /// Transaction ID.
    pub id: TransactionId,

    /// Whether the account sent or received the coins.
    pub direction: Direction,

    /// Username of the other party.
    pub counterparty: String,

    /// Coins moved.
    pub amount: i64,
}

/// Number of units of one item an account owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holding {
    /// Item name.
    pub item: String,

    /// How many times the account bought it.
    pub quantity: i64,
}
