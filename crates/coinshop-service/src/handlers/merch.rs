//! Merch catalog and purchase handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use coinshop_core::{validate, CatalogItem};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Catalog entry.
#[derive(Debug, Serialize)]
pub struct MerchItem {
    /// Item name.
    pub name: String,
    /// Price in coins.
    pub price: i64,
}

impl From<CatalogItem> for MerchItem {
    fn from(item: CatalogItem) -> Self {
        Self {
            name: item.name,
            price: item.price,
        }
    }
}

/// Buy one unit of `item`.
pub async fn buy_item(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(item): Path<String>,
) -> Result<StatusCode, ApiError> {
    validate::item_name(&item)?;

    state.ledger.purchase(auth.account_id, &item).await?;

    Ok(StatusCode::OK)
}

/// List the catalog, ordered by name.
pub async fn list_merch(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MerchItem>>, ApiError> {
    let items = state.store.list_items().await?;

    Ok(Json(items.into_iter().map(MerchItem::from).collect()))
}
