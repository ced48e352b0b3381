//! Coinshop HTTP API service.
//!
//! This crate provides the HTTP API for the coinshop merch store:
//!
//! - Login with on-the-fly registration
//! - Coin transfers between users
//! - Merch purchases
//! - Profile snapshots (balance, inventory, coin history)
//!
//! # Ledger
//!
//! [`Ledger`] is the only writer of balances. It delegates each transfer and
//! purchase to one atomic unit of work in `coinshop-store`.
//!
//! # Authentication
//!
//! `POST /api/auth` returns an HS256 bearer token; every other `/api` route
//! except the catalog listing requires it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod handlers;
pub mod history;
pub mod ledger;
pub mod routes;
pub mod state;

pub use config::{ConfigError, ServiceConfig};
pub use error::ApiError;
pub use history::HistoryReader;
pub use ledger::Ledger;
pub use routes::create_router;
pub use state::AppState;
