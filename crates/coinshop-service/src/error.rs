//! API error types and responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use coinshop_core::{LedgerError, ValidationError};
use coinshop_store::StoreError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid token, or wrong password.
    #[error("unauthorized")]
    Unauthorized,

    /// Bad request - invalid input.
    #[error("{0}")]
    BadRequest(String),

    /// The debited account cannot cover the amount.
    #[error("insufficient funds")]
    InsufficientFunds,

    /// Transfer recipient does not exist.
    #[error("recipient not found: {0}")]
    RecipientNotFound(String),

    /// Catalog item does not exist.
    #[error("item not found: {0}")]
    ItemNotFound(String),

    /// The store did not confirm the request. For transfers and purchases
    /// the outcome is unknown and the caller should check its profile before
    /// sending the request again.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    errors: String,
    code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", self.to_string()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            Self::InsufficientFunds => (
                StatusCode::BAD_REQUEST,
                "insufficient_funds",
                self.to_string(),
            ),
            Self::RecipientNotFound(_) => (
                StatusCode::BAD_REQUEST,
                "recipient_not_found",
                self.to_string(),
            ),
            Self::ItemNotFound(_) => (StatusCode::BAD_REQUEST, "item_not_found", self.to_string()),
            Self::StorageUnavailable(msg) => {
                tracing::error!(error = %msg, "Storage unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "storage_unavailable",
                    "Storage is temporarily unavailable".to_string(),
                )
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            errors: message,
            code,
        };

        (status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientFunds => Self::InsufficientFunds,
            LedgerError::RecipientNotFound { username } => Self::RecipientNotFound(username),
            LedgerError::ItemNotFound { name } => Self::ItemNotFound(name),
            LedgerError::InvalidAmount(_) | LedgerError::SelfTransfer => {
                Self::BadRequest(err.to_string())
            }
            LedgerError::AccountNotFound { .. } => Self::Internal(err.to_string()),
            LedgerError::StorageUnavailable(msg) => Self::StorageUnavailable(msg),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        LedgerError::from(err).into()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
