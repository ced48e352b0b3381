//! Core types and utilities for coinshop.
//!
//! This crate provides the foundational types shared by the store, the ledger
//! engine and the HTTP service:
//!
//! - **Identifiers**: `AccountId`, `ItemId`, `OrderId`, `TransactionId`
//! - **State**: `Account`, `CatalogItem`
//! - **Ledger records**: `Order`, `CoinTransaction`, `TransferEntry`, `Holding`
//! - **Read model**: `Profile`
//! - **Errors**: `LedgerError`, the closed set every ledger operation fails with
//!
//! # Coins
//!
//! Coins are whole units stored as `i64`. A balance never drops below zero.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod error;
pub mod ids;
pub mod ledger;
pub mod profile;
pub mod validate;

pub use account::{Account, CatalogItem, MAX_COINS, STARTING_BALANCE};
pub use error::LedgerError;
pub use ids::{AccountId, IdError, ItemId, OrderId, TransactionId};
pub use ledger::{CoinTransaction, Direction, Holding, Order, TransferEntry};
pub use profile::{CoinHistory, InventoryItem, Profile, ReceivedCoins, SentCoins};
pub use validate::ValidationError;
