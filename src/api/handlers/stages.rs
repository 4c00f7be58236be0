//! Stage handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::api::AppState;
use crate::api::auth::AuthenticatedEntity;
use crate::api::error::{ApiError, ErrorResponse, db_error};
use crate::db::{Database, Id, NewStage, Stage, StageRepository, StageUpdate};

#[derive(Serialize, ToSchema)]
pub struct StageResponse {
    #[schema(example = 1)]
    pub id: Id,
    pub project_id: Id,
    #[schema(example = "Backlog")]
    pub name: String,
    #[schema(example = "Tasks to be done")]
    pub description: String,
    /// Zero-based order within the project
    #[schema(example = 0)]
    pub position: i64,
    pub created_at: String,
}

impl From<Stage> for StageResponse {
    fn from(s: Stage) -> Self {
        Self {
            id: s.id,
            project_id: s.project_id,
            name: s.name,
            description: s.description,
            position: s.position,
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStageRequest {
    #[schema(example = "Released")]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Stage rename. Position is fixed once created.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateStageRequest {
    #[schema(example = "Review")]
    pub name: Option<String>,
    pub description: Option<String>,
}

/// List a project's stages
#[utoipa::path(
    get,
    path = "/projects/{id}/stages",
    tag = "stages",
    params(("id" = i64, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Stages by position", body = Vec<StageResponse>),
        (status = 404, description = "Project not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_stages<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<Id>,
) -> Result<Json<Vec<StageResponse>>, ApiError> {
    let stages = state.db().stages().list(id).await.map_err(db_error)?;
    Ok(Json(stages.into_iter().map(StageResponse::from).collect()))
}

/// Append a stage
///
/// Adds a stage after the project's last one
#[utoipa::path(
    post,
    path = "/projects/{id}/stages",
    tag = "stages",
    params(("id" = i64, Path, description = "Project ID")),
    request_body = CreateStageRequest,
    responses(
        (status = 201, description = "Stage created", body = StageResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or unknown API key", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
#[instrument(skip(state, caller, req), fields(entity_id = caller.0.id))]
pub async fn create_stage<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Path(id): Path<Id>,
    caller: AuthenticatedEntity,
    Json(req): Json<CreateStageRequest>,
) -> Result<(StatusCode, Json<StageResponse>), ApiError> {
    let stage = state
        .db()
        .stages()
        .create(
            id,
            &NewStage {
                name: req.name,
                description: req.description,
            },
        )
        .await
        .map_err(db_error)?;

    Ok((StatusCode::CREATED, Json(stage.into())))
}

/// Update a stage
#[utoipa::path(
    patch,
    path = "/stages/{id}",
    tag = "stages",
    params(("id" = i64, Path, description = "Stage ID")),
    request_body = UpdateStageRequest,
    responses(
        (status = 200, description = "Stage updated", body = StageResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or unknown API key", body = ErrorResponse),
        (status = 404, description = "Stage not found", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
#[instrument(skip(state, caller, req), fields(entity_id = caller.0.id))]
pub async fn update_stage<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Path(id): Path<Id>,
    caller: AuthenticatedEntity,
    Json(req): Json<UpdateStageRequest>,
) -> Result<Json<StageResponse>, ApiError> {
    let stage = state
        .db()
        .stages()
        .update(
            id,
            &StageUpdate {
                name: req.name,
                description: req.description,
            },
        )
        .await
        .map_err(db_error)?;

    Ok(Json(stage.into()))
}

/// Delete a stage
///
/// Only empty stages can go, and a project keeps at least one
#[utoipa::path(
    delete,
    path = "/stages/{id}",
    tag = "stages",
    params(("id" = i64, Path, description = "Stage ID")),
    responses(
        (status = 204, description = "Stage deleted"),
        (status = 401, description = "Missing or unknown API key", body = ErrorResponse),
        (status = 404, description = "Stage not found", body = ErrorResponse),
        (status = 409, description = "Stage holds tasks or is the last one", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
#[instrument(skip(state, caller), fields(entity_id = caller.0.id))]
pub async fn delete_stage<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Path(id): Path<Id>,
    caller: AuthenticatedEntity,
) -> Result<StatusCode, ApiError> {
    state.db().stages().delete(id).await.map_err(db_error)?;
    info!(stage_id = id, "stage deleted");
    Ok(StatusCode::NO_CONTENT)
}
