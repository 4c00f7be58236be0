//! Project management handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use super::{StageResponse, TaskResponse, parse_filter};
use crate::api::AppState;
use crate::api::auth::AuthenticatedEntity;
use crate::api::error::{ApiError, ErrorResponse, db_error};
use crate::db::{
    Database, Id, NewProject, NewProjectTask, Project, ProjectDetails, ProjectRepository,
    ProjectStatus, ProjectUpdate,
};

// =============================================================================
// DTOs (Data Transfer Objects)
// =============================================================================

/// Project response DTO
#[derive(Serialize, ToSchema)]
pub struct ProjectResponse {
    #[schema(example = 1)]
    pub id: Id,
    #[schema(example = "Build AI Agent")]
    pub name: String,
    #[schema(example = "An agent that triages issues")]
    pub description: String,
    /// pending, approved or rejected
    #[schema(example = "pending")]
    pub status: String,
    pub owner_id: Id,
    pub reviewer_id: Option<Id>,
    #[schema(example = "2025-01-01 00:00:00")]
    pub created_at: String,
    #[schema(example = "2025-01-01 00:00:00")]
    pub updated_at: String,
}

impl From<Project> for ProjectResponse {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            status: p.status.to_string(),
            owner_id: p.owner_id,
            reviewer_id: p.reviewer_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// A stage with the tasks it holds
#[derive(Serialize, ToSchema)]
pub struct StageWithTasksResponse {
    #[serde(flatten)]
    pub stage: StageResponse,
    pub tasks: Vec<TaskResponse>,
}

/// Project with its ordered stages and their tasks
#[derive(Serialize, ToSchema)]
pub struct ProjectDetailsResponse {
    #[serde(flatten)]
    pub project: ProjectResponse,
    pub stages: Vec<StageWithTasksResponse>,
}

impl From<ProjectDetails> for ProjectDetailsResponse {
    fn from(d: ProjectDetails) -> Self {
        Self {
            project: d.project.into(),
            stages: d
                .stages
                .into_iter()
                .map(|s| StageWithTasksResponse {
                    stage: s.stage.into(),
                    tasks: s.tasks.into_iter().map(TaskResponse::from).collect(),
                })
                .collect(),
        }
    }
}

/// Task listed in a create project request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProjectTaskRequest {
    #[schema(example = "Design agent architecture")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[schema(example = json!(["ai", "design"]))]
    pub required_skills: Vec<String>,
    /// 0 (lowest) to 10 (highest)
    #[serde(default)]
    #[schema(example = 10)]
    pub priority: i64,
}

/// Create project request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    #[schema(example = "Build AI Agent")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tasks: Vec<ProjectTaskRequest>,
}

/// Everything written by one project creation
#[derive(Serialize, ToSchema)]
pub struct CreateProjectResponse {
    pub project: ProjectResponse,
    pub stage_ids: Vec<Id>,
    pub task_ids: Vec<Id>,
}

/// Project edit. Status only changes through approve or reject.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateProjectRequest {
    #[schema(example = "Build AI Agent v2")]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListProjectsQuery {
    /// Filter by status (pending, approved, rejected)
    #[param(example = "pending")]
    pub status: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// List projects
///
/// Returns projects in creation order, optionally filtered by status
#[utoipa::path(
    get,
    path = "/projects",
    tag = "projects",
    params(ListProjectsQuery),
    responses(
        (status = 200, description = "Projects", body = Vec<ProjectResponse>),
        (status = 400, description = "Unknown status", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_projects<D: Database>(
    State(state): State<AppState<D>>,
    Query(query): Query<ListProjectsQuery>,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    let status = parse_filter::<ProjectStatus>(query.status.as_deref())?;

    let projects = state
        .db()
        .projects()
        .list(status)
        .await
        .map_err(db_error)?;

    Ok(Json(projects.into_iter().map(ProjectResponse::from).collect()))
}

/// Get a project
///
/// Returns the project with its ordered stages and their tasks
#[utoipa::path(
    get,
    path = "/projects/{id}",
    tag = "projects",
    params(("id" = i64, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project found", body = ProjectDetailsResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_project<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<Id>,
) -> Result<Json<ProjectDetailsResponse>, ApiError> {
    let details = state.db().projects().details(id).await.map_err(db_error)?;
    Ok(Json(details.into()))
}

/// Create a project
///
/// Creates a pending project owned by the caller, with the default stages
/// and any listed tasks in the first stage
#[utoipa::path(
    post,
    path = "/projects",
    tag = "projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = CreateProjectResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or unknown API key", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
#[instrument(skip(state, caller, req), fields(entity_id = caller.0.id))]
pub async fn create_project<D: Database + 'static>(
    State(state): State<AppState<D>>,
    caller: AuthenticatedEntity,
    Json(req): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<CreateProjectResponse>), ApiError> {
    let project = NewProject {
        name: req.name,
        description: req.description,
        owner_id: caller.0.id,
        tasks: req
            .tasks
            .into_iter()
            .map(|t| NewProjectTask {
                title: t.title,
                description: t.description,
                required_skills: t.required_skills,
                priority: t.priority,
            })
            .collect(),
    };

    let created = state
        .db()
        .projects()
        .create(&project)
        .await
        .map_err(db_error)?;
    info!(project_id = created.project.id, "project created");

    Ok((
        StatusCode::CREATED,
        Json(CreateProjectResponse {
            project: created.project.into(),
            stage_ids: created.stage_ids,
            task_ids: created.task_ids,
        }),
    ))
}

/// Update a project
///
/// Edits name and description. Omitted fields are left unchanged.
#[utoipa::path(
    patch,
    path = "/projects/{id}",
    tag = "projects",
    params(("id" = i64, Path, description = "Project ID")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = ProjectResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or unknown API key", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse),
        (status = 422, description = "Unknown field such as status")
    ),
    security(("api_key" = []))
)]
#[instrument(skip(state, caller, req), fields(entity_id = caller.0.id))]
pub async fn update_project<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Path(id): Path<Id>,
    caller: AuthenticatedEntity,
    Json(req): Json<UpdateProjectRequest>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let project = state
        .db()
        .projects()
        .update(
            id,
            &ProjectUpdate {
                name: req.name,
                description: req.description,
            },
        )
        .await
        .map_err(db_error)?;
    info!(project_id = id, "project updated");

    Ok(Json(project.into()))
}

async fn review<D: Database>(
    state: &AppState<D>,
    id: Id,
    reviewer: &AuthenticatedEntity,
    decision: ProjectStatus,
) -> Result<Json<ProjectResponse>, ApiError> {
    let project = state
        .db()
        .projects()
        .review(id, reviewer.0.id, decision)
        .await
        .map_err(db_error)?;
    info!(project_id = id, status = %decision, "project reviewed");
    Ok(Json(project.into()))
}

/// Approve a project
///
/// Moves a pending project to approved. Review is final.
#[utoipa::path(
    post,
    path = "/projects/{id}/approve",
    tag = "projects",
    params(("id" = i64, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project approved", body = ProjectResponse),
        (status = 401, description = "Missing or unknown API key", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse),
        (status = 409, description = "Project is not pending", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
#[instrument(skip(state, caller), fields(entity_id = caller.0.id))]
pub async fn approve_project<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Path(id): Path<Id>,
    caller: AuthenticatedEntity,
) -> Result<Json<ProjectResponse>, ApiError> {
    review(&state, id, &caller, ProjectStatus::Approved).await
}

/// Reject a project
///
/// Moves a pending project to rejected. Review is final.
#[utoipa::path(
    post,
    path = "/projects/{id}/reject",
    tag = "projects",
    params(("id" = i64, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project rejected", body = ProjectResponse),
        (status = 401, description = "Missing or unknown API key", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse),
        (status = 409, description = "Project is not pending", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
#[instrument(skip(state, caller), fields(entity_id = caller.0.id))]
pub async fn reject_project<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Path(id): Path<Id>,
    caller: AuthenticatedEntity,
) -> Result<Json<ProjectResponse>, ApiError> {
    review(&state, id, &caller, ProjectStatus::Rejected).await
}

/// Delete a project
///
/// Deletes a project with its stages, tasks, and comments
#[utoipa::path(
    delete,
    path = "/projects/{id}",
    tag = "projects",
    params(("id" = i64, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 401, description = "Missing or unknown API key", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
#[instrument(skip(state, caller), fields(entity_id = caller.0.id))]
pub async fn delete_project<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Path(id): Path<Id>,
    caller: AuthenticatedEntity,
) -> Result<StatusCode, ApiError> {
    state.db().projects().delete(id).await.map_err(db_error)?;
    info!(project_id = id, "project deleted");
    Ok(StatusCode::NO_CONTENT)
}
