//! HTTP error mapping.

use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::db::DbError;

/// Error response DTO
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    #[schema(example = "Entity not found: Project with id '7'")]
    pub error: String,
    /// Machine-readable kind: validation, unauthorized, not_found,
    /// invalid_state, conflict or unavailable
    #[schema(example = "not_found")]
    pub kind: String,
}

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, kind: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            kind: kind.to_string(),
        }),
    )
}

pub(crate) fn unauthorized(message: &str) -> ApiError {
    api_error(StatusCode::UNAUTHORIZED, "unauthorized", message)
}

/// Map a store error to a status code. Engine text is logged, not returned.
pub(crate) fn db_error(e: DbError) -> ApiError {
    match e {
        DbError::Validation { message } => {
            api_error(StatusCode::BAD_REQUEST, "validation", message)
        }
        DbError::NotFound { .. } => api_error(StatusCode::NOT_FOUND, "not_found", e.to_string()),
        DbError::InvalidState { message } => {
            api_error(StatusCode::CONFLICT, "invalid_state", message)
        }
        DbError::Busy { .. } | DbError::Constraint { .. } => {
            error!(error = %e, "write rejected by the data store");
            api_error(
                StatusCode::CONFLICT,
                "conflict",
                "the data changed concurrently; retry",
            )
        }
        DbError::Database { .. } | DbError::Migration { .. } | DbError::Connection { .. } => {
            error!(error = %e, "data store failure");
            api_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "unavailable",
                "the data store is unavailable",
            )
        }
    }
}
