//! Request and response types for the coinshop client.

use serde::{Deserialize, Serialize};

pub use coinshop_core::{CoinHistory, InventoryItem, Profile, ReceivedCoins, SentCoins};

/// Login request.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AuthRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Login response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AuthResponse {
    pub token: String,
}

/// Send coin request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendCoinRequest<'a> {
    pub to_user: &'a str,
    pub amount: i64,
}

/// Catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MerchItem {
    /// Item name.
    pub name: String,
    /// Price in coins.
    pub price: i64,
}

/// API error response envelope.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub errors: String,
    pub code: String,
}
