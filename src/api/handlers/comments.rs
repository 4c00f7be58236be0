//! Comment handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use crate::api::AppState;
use crate::api::auth::AuthenticatedEntity;
use crate::api::error::{ApiError, ErrorResponse, db_error};
use crate::db::{Comment, CommentRepository, Database, Id, NewComment};

#[derive(Serialize, ToSchema)]
pub struct CommentResponse {
    #[schema(example = 1)]
    pub id: Id,
    pub task_id: Id,
    pub author_id: Id,
    #[schema(example = "Blocked on API credentials")]
    pub content: String,
    pub created_at: String,
}

impl From<Comment> for CommentResponse {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            task_id: c.task_id,
            author_id: c.author_id,
            content: c.content,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCommentRequest {
    #[schema(example = 1)]
    pub task_id: Id,
    #[schema(example = "Blocked on API credentials")]
    pub content: String,
}

/// Comment on a task
///
/// The caller is recorded as the author. Comments are append-only.
#[utoipa::path(
    post,
    path = "/comments",
    tag = "comments",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or unknown API key", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    ),
    security(("api_key" = []))
)]
#[instrument(skip(state, caller, req), fields(entity_id = caller.0.id, task_id = req.task_id))]
pub async fn create_comment<D: Database + 'static>(
    State(state): State<AppState<D>>,
    caller: AuthenticatedEntity,
    Json(req): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let comment = state
        .db()
        .comments()
        .create(&NewComment {
            task_id: req.task_id,
            author_id: caller.0.id,
            content: req.content,
        })
        .await
        .map_err(db_error)?;

    Ok((StatusCode::CREATED, Json(comment.into())))
}

/// List a task's comments, oldest first
#[utoipa::path(
    get,
    path = "/tasks/{id}/comments",
    tag = "comments",
    params(("id" = i64, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Comments", body = Vec<CommentResponse>),
        (status = 404, description = "Task not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_task_comments<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<Id>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let comments = state.db().comments().list(id).await.map_err(db_error)?;
    Ok(Json(comments.into_iter().map(CommentResponse::from).collect()))
}
