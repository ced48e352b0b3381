//! Profile handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use coinshop_core::Profile;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Get the caller's balance, inventory and coin history.
pub async fn get_info(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<Profile>, ApiError> {
    let profile = state.history.profile(auth.account_id).await?;

    Ok(Json(profile))
}
