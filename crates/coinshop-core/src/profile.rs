//! Profile snapshot returned to account holders.
//!
//! The wire shape (`coins`, `inventory`, `coinHistory`) is fixed by existing
//! merch store clients, so field names are camelCase.

use serde::{Deserialize, Serialize};

use crate::ledger::{Direction, Holding, TransferEntry};

/// Point-in-time view of an account: balance, owned items, and transfers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Current balance.
    pub coins: i64,

    /// Owned items, sorted by name.
    pub inventory: Vec<InventoryItem>,

    /// Transfers the account took part in.
    pub coin_history: CoinHistory,
}

/// One owned item type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Item name.
    #[serde(rename = "type")]
    pub item_type: String,

    /// Units owned.
    pub quantity: i64,
}

/// Transfers split by direction, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinHistory {
    /// Incoming transfers.
    pub received: Vec<ReceivedCoins>,

    /// Outgoing transfers.
    pub sent: Vec<SentCoins>,
}

/// An incoming transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedCoins {
    /// Sender's username.
    pub from_user: String,
    /// Coins received.
    pub amount: i64,
}

/// An outgoing transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentCoins {
    /// Recipient's username.
    pub to_user: String,
    /// Coins sent.
    pub amount: i64,
}

impl Profile {
    /// Build a profile from raw store reads.
    ///
    /// `entries` must already be ordered newest first; that order is kept
    /// within each direction. Holdings are sorted by item name.
    #[must_use]
    pub fn assemble(balance: i64, mut holdings: Vec<Holding>, entries: Vec<TransferEntry>) -> Self {
        holdings.sort_by(|a, b| a.item.cmp(&b.item));

        let inventory = holdings
            .into_iter()
            .map(|h| InventoryItem {
                item_type: h.item,
                quantity: h.quantity,
            })
            .collect();

        let mut coin_history = CoinHistory::default();
        for entry in entries {
            match entry.direction {
                Direction::Received => coin_history.received.push(ReceivedCoins {
                    from_user: entry.counterparty,
                    amount: entry.amount,
                }),
                Direction::Sent => coin_history.sent.push(SentCoins {
                    to_user: entry.counterparty,
                    amount: entry.amount,
                }),
            }
        }

        Self {
            coins: balance,
            inventory,
            coin_history,
        }
    }
}
