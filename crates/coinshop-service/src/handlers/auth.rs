//! Login handler.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::error::ApiError;
use crate::state::AppState;

/// Login request.
#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    /// Username; an unknown one is registered on the spot.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Bearer token for the other endpoints.
    pub token: String,
}

/// Exchange a username and password for a token, creating the account on
/// first login.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(body) = body?;

    let token = auth::login(&state, &body.username, &body.password).await?;

    Ok(Json(AuthResponse { token }))
}
