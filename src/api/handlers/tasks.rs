//! Task management handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use super::parse_filter;
use crate::api::AppState;
use crate::api::auth::AuthenticatedEntity;
use crate::api::error::{ApiError, ErrorResponse, db_error};
use crate::db::{
    Database, Id, NewTask, Task, TaskLog, TaskQuery, TaskRepository, TaskStatus, TaskUpdate,
};

// =============================================================================
// DTOs
// =============================================================================

/// Task response DTO. Deserializes back into [`Task`].
#[derive(Serialize, ToSchema)]
pub struct TaskResponse {
    #[schema(example = 1)]
    pub id: Id,
    pub project_id: Id,
    pub stage_id: Id,
    #[schema(example = "Design agent architecture")]
    pub title: String,
    pub description: String,
    #[schema(example = json!(["ai", "design"]))]
    pub required_skills: Vec<String>,
    #[schema(example = 10)]
    pub priority: i64,
    /// pending, in_progress, blocked or completed
    #[schema(example = "pending")]
    pub status: String,
    pub assignee_id: Option<Id>,
    pub created_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
}

impl From<Task> for TaskResponse {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            project_id: t.project_id,
            stage_id: t.stage_id,
            title: t.title,
            description: t.description,
            required_skills: t.required_skills,
            priority: t.priority,
            status: t.status.to_string(),
            assignee_id: t.assignee_id,
            created_at: t.created_at,
            updated_at: t.updated_at,
            completed_at: t.completed_at,
        }
    }
}

/// Task activity entry
#[derive(Serialize, ToSchema)]
pub struct TaskLogResponse {
    pub id: Id,
    pub task_id: Id,
    /// created, status, stage or assignment
    #[schema(example = "status")]
    pub kind: String,
    #[schema(example = "status pending -> in_progress")]
    pub message: String,
    pub created_at: String,
}

impl From<TaskLog> for TaskLogResponse {
    fn from(l: TaskLog) -> Self {
        Self {
            id: l.id,
            task_id: l.task_id,
            kind: l.kind.to_string(),
            message: l.message,
            created_at: l.created_at,
        }
    }
}

/// Create task request DTO. Also sent by the MCP adapter in delegated mode.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    #[schema(example = 1)]
    pub project_id: Id,
    #[schema(example = "Write integration tests")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[schema(example = json!(["testing"]))]
    pub required_skills: Vec<String>,
    /// 0 (lowest) to 10 (highest)
    #[serde(default)]
    #[schema(example = 5)]
    pub priority: i64,
}

/// Absent stays `None`; explicit `null` becomes `Some(None)`.
fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Partial task update. Omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub required_skills: Option<Vec<String>>,
    pub priority: Option<i64>,
    /// pending, in_progress, blocked or completed ('done' is accepted)
    #[schema(example = "in_progress")]
    pub status: Option<String>,
    /// Stage of the same project to move the task to
    pub stage_id: Option<Id>,
    /// Entity to assign; `null` unassigns
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub assignee_id: Option<Option<Id>>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListTasksQuery {
    /// Filter by project
    pub project_id: Option<Id>,
    /// Filter by stage
    pub stage_id: Option<Id>,
    /// Filter by status (pending, in_progress, blocked, completed)
    #[param(example = "pending")]
    pub status: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Create a task
///
/// Creates a task in the first stage of its project
#[utoipa::path(
    post,
    path = "/tasks",
    tag = "tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or unknown API key", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
#[instrument(skip(state, caller, req), fields(entity_id = caller.0.id, project_id = req.project_id))]
pub async fn create_task<D: Database + 'static>(
    State(state): State<AppState<D>>,
    caller: AuthenticatedEntity,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let task = state
        .db()
        .tasks()
        .create(&NewTask {
            project_id: req.project_id,
            title: req.title,
            description: req.description,
            required_skills: req.required_skills,
            priority: req.priority,
        })
        .await
        .map_err(db_error)?;
    info!(task_id = task.id, "task created");

    Ok((StatusCode::CREATED, Json(task.into())))
}

/// List tasks
///
/// Returns tasks matching every given filter, in creation order
#[utoipa::path(
    get,
    path = "/tasks",
    tag = "tasks",
    params(ListTasksQuery),
    responses(
        (status = 200, description = "Tasks", body = Vec<TaskResponse>),
        (status = 400, description = "Unknown status", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_tasks<D: Database>(
    State(state): State<AppState<D>>,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let db_query = TaskQuery {
        project_id: query.project_id,
        stage_id: query.stage_id,
        status: parse_filter::<TaskStatus>(query.status.as_deref())?,
    };

    let tasks = state
        .db()
        .tasks()
        .list(&db_query)
        .await
        .map_err(db_error)?;

    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// List available tasks
///
/// Pending and in-progress tasks across all projects, highest priority first
#[utoipa::path(
    get,
    path = "/tasks/available",
    tag = "tasks",
    responses(
        (status = 200, description = "Tasks open for work", body = Vec<TaskResponse>)
    )
)]
#[instrument(skip(state))]
pub async fn list_available_tasks<D: Database>(
    State(state): State<AppState<D>>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let tasks = state.db().tasks().available().await.map_err(db_error)?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// List a task's activity log
///
/// Newest entries first
#[utoipa::path(
    get,
    path = "/tasks/{id}/logs",
    tag = "tasks",
    params(("id" = i64, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Activity entries", body = Vec<TaskLogResponse>),
        (status = 404, description = "Task not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_task_logs<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<Id>,
) -> Result<Json<Vec<TaskLogResponse>>, ApiError> {
    let logs = state.db().tasks().logs(id).await.map_err(db_error)?;
    Ok(Json(logs.into_iter().map(TaskLogResponse::from).collect()))
}

/// Get a task
#[utoipa::path(
    get,
    path = "/tasks/{id}",
    tag = "tasks",
    params(("id" = i64, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task found", body = TaskResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_task<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<Id>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = state.db().tasks().get(id).await.map_err(db_error)?;
    Ok(Json(task.into()))
}

/// Update a task
///
/// Applies a partial update. A stage must belong to the task's project.
#[utoipa::path(
    patch,
    path = "/tasks/{id}",
    tag = "tasks",
    params(("id" = i64, Path, description = "Task ID")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or unknown API key", body = ErrorResponse),
        (status = 404, description = "Task, stage or assignee not found", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
#[instrument(skip(state, caller, req), fields(entity_id = caller.0.id))]
pub async fn update_task<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Path(id): Path<Id>,
    caller: AuthenticatedEntity,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let update = TaskUpdate {
        title: req.title,
        description: req.description,
        required_skills: req.required_skills,
        priority: req.priority,
        status: parse_filter::<TaskStatus>(req.status.as_deref())?,
        stage_id: req.stage_id,
        assignee_id: req.assignee_id,
    };

    let task = state
        .db()
        .tasks()
        .update(id, &update)
        .await
        .map_err(db_error)?;

    Ok(Json(task.into()))
}

/// Delete a task
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    tag = "tasks",
    params(("id" = i64, Path, description = "Task ID")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 401, description = "Missing or unknown API key", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
#[instrument(skip(state, caller), fields(entity_id = caller.0.id))]
pub async fn delete_task<D: Database + 'static>(
    State(state): State<AppState<D>>,
    Path(id): Path<Id>,
    caller: AuthenticatedEntity,
) -> Result<StatusCode, ApiError> {
    state.db().tasks().delete(id).await.map_err(db_error)?;
    Ok(StatusCode::NO_CONTENT)
}
