//! Coinshop Client SDK.
//!
//! This crate provides a typed client for the coinshop HTTP API.
//!
//! # Example
//!
//! ```no_run
//! use coinshop_client::CoinshopClient;
//!
//! # async fn example() -> Result<(), coinshop_client::ClientError> {
//! let client = CoinshopClient::new("http://localhost:8080")?;
//!
//! let token = client.authenticate("alice", "password").await?;
//! client.send_coin(&token, "bob", 100).await?;
//! client.buy(&token, "cup").await?;
//!
//! let profile = client.info(&token).await?;
//! println!("{} coins left", profile.coins);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, CoinshopClient};
pub use error::ClientError;
pub use types::*;
