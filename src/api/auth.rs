//! API key authentication.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::error::{ApiError, db_error, unauthorized};
use super::state::AppState;
use crate::db::{Database, Entity, EntityRepository};

/// Header carrying an entity's API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// The active entity behind the request's `X-API-Key`.
///
/// Handlers that take this extractor reject requests without a valid key
/// with 401 before running.
#[derive(Debug, Clone)]
pub struct AuthenticatedEntity(pub Entity);

impl<D: Database + 'static> FromRequestParts<AppState<D>> for AuthenticatedEntity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<D>,
    ) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get(API_KEY_HEADER)
            .ok_or_else(|| unauthorized("Missing X-API-Key header"))?
            .to_str()
            .map_err(|_| unauthorized("Invalid X-API-Key header"))?
            .trim();

        let entity = state
            .db()
            .entities()
            .get_by_api_key(key)
            .await
            .map_err(db_error)?
            .ok_or_else(|| unauthorized("Unknown API key"))?;

        Ok(AuthenticatedEntity(entity))
    }
}
