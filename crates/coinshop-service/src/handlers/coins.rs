//! Coin transfer handler.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use coinshop_core::validate;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Send coin request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCoinRequest {
    /// Recipient username.
    pub to_user: String,
    /// Coins to send.
    pub amount: i64,
}

/// Send coins to another user.
pub async fn send_coin(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    body: Result<Json<SendCoinRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(body) = body?;

    validate::username(&body.to_user)?;
    validate::amount(body.amount)?;

    state
        .ledger
        .transfer(auth.account_id, &body.to_user, body.amount)
        .await?;

    Ok(StatusCode::OK)
}
