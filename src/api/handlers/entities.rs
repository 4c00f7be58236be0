//! Entity registration handlers.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use super::parse_filter;
use crate::api::AppState;
use crate::api::error::{ApiError, ErrorResponse, db_error};
use crate::db::{Database, Entity, EntityKind, EntityRepository, Id, NewEntity};

// =============================================================================
// DTOs
// =============================================================================

/// Entity response DTO. Never carries the API key.
#[derive(Serialize, ToSchema)]
pub struct EntityResponse {
    #[schema(example = 1)]
    pub id: Id,
    #[schema(example = "planner-bot")]
    pub name: String,
    #[schema(example = "agent")]
    pub kind: String,
    #[schema(example = json!(["ai", "design"]))]
    pub skills: Vec<String>,
    pub is_active: bool,
    pub created_at: String,
}

impl From<Entity> for EntityResponse {
    fn from(e: Entity) -> Self {
        Self {
            id: e.id,
            name: e.name,
            kind: e.kind.to_string(),
            skills: e.skills,
            is_active: e.is_active,
            created_at: e.created_at,
        }
    }
}

/// Registration response: the only place an API key is ever returned.
#[derive(Serialize, ToSchema)]
pub struct RegisteredEntityResponse {
    pub entity: EntityResponse,
    #[schema(example = "kb_0f8c2d7e9a6b4c3d8e1f2a3b4c5d6e7f")]
    pub api_key: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterEntityRequest {
    #[schema(example = "planner-bot")]
    pub name: String,
    #[serde(default)]
    #[schema(example = json!(["ai", "design"]))]
    pub skills: Vec<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListEntitiesQuery {
    /// Filter by kind (human, agent)
    #[param(example = "agent")]
    pub kind: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

async fn register<D: Database>(
    state: &AppState<D>,
    kind: EntityKind,
    req: RegisterEntityRequest,
) -> Result<(StatusCode, Json<RegisteredEntityResponse>), ApiError> {
    let entity = state
        .db()
        .entities()
        .register(&NewEntity {
            name: req.name,
            kind,
            skills: req.skills,
        })
        .await
        .map_err(db_error)?;
    info!(entity_id = entity.id, %kind, "registered entity");

    let api_key = entity.api_key.clone();
    Ok((
        StatusCode::CREATED,
        Json(RegisteredEntityResponse {
            entity: EntityResponse::from(entity),
            api_key,
        }),
    ))
}

/// Register a human
///
/// Creates a human entity and returns its generated API key
#[utoipa::path(
    post,
    path = "/entities/register/human",
    tag = "entities",
    request_body = RegisterEntityRequest,
    responses(
        (status = 201, description = "Entity registered", body = RegisteredEntityResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn register_human<D: Database>(
    State(state): State<AppState<D>>,
    Json(req): Json<RegisterEntityRequest>,
) -> Result<(StatusCode, Json<RegisteredEntityResponse>), ApiError> {
    register(&state, EntityKind::Human, req).await
}

/// Register an agent
///
/// Creates an agent entity and returns its generated API key
#[utoipa::path(
    post,
    path = "/entities/register/agent",
    tag = "entities",
    request_body = RegisterEntityRequest,
    responses(
        (status = 201, description = "Entity registered", body = RegisteredEntityResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn register_agent<D: Database>(
    State(state): State<AppState<D>>,
    Json(req): Json<RegisterEntityRequest>,
) -> Result<(StatusCode, Json<RegisteredEntityResponse>), ApiError> {
    register(&state, EntityKind::Agent, req).await
}

/// List entities
#[utoipa::path(
    get,
    path = "/entities",
    tag = "entities",
    params(ListEntitiesQuery),
    responses(
        (status = 200, description = "Active entities", body = Vec<EntityResponse>),
        (status = 400, description = "Unknown kind", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_entities<D: Database>(
    State(state): State<AppState<D>>,
    Query(query): Query<ListEntitiesQuery>,
) -> Result<Json<Vec<EntityResponse>>, ApiError> {
    let kind = parse_filter::<EntityKind>(query.kind.as_deref())?;

    let entities = state
        .db()
        .entities()
        .list(kind)
        .await
        .map_err(db_error)?;

    Ok(Json(entities.into_iter().map(EntityResponse::from).collect()))
}
