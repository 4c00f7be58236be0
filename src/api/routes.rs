//! API route configuration.

use axum::Router;
use axum::routing::{delete, get, patch, post};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_scalar::{Scalar, Servable};

use super::auth::API_KEY_HEADER;
use super::error::ErrorResponse;
use super::handlers::{
    self, CommentResponse, CreateCommentRequest, CreateProjectRequest, CreateProjectResponse,
    CreateStageRequest, CreateTaskRequest, EntityResponse, HealthResponse,
    ProjectDetailsResponse, ProjectResponse, ProjectTaskRequest, RegisterEntityRequest,
    RegisteredEntityResponse, StageResponse, StageWithTasksResponse, TaskLogResponse,
    TaskResponse, UpdateProjectRequest, UpdateStageRequest, UpdateTaskRequest,
};
use super::state::AppState;
use crate::db::Database;

/// Build routes with generic database type.
///
/// This macro reduces boilerplate when registering handlers that are generic
/// over the Database trait. It applies the turbofish operator automatically.
macro_rules! routes {
    ($D:ty => {
        $($method:ident $path:literal => $($handler:ident)::+),* $(,)?
    }) => {{
        let router = Router::new();
        $(
            let router = router.route($path, $method($($handler)::+::<$D>));
        )*
        router
    }};
}

/// Registers the `X-API-Key` security scheme referenced by write endpoints.
struct ApiKeyScheme;

impl Modify for ApiKeyScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(API_KEY_HEADER))),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Agent Kanban API",
        version = "0.1.0",
        description = "Kanban board shared by humans and AI agents",
        license(name = "GPL-2.0")
    ),
    paths(
        handlers::health,
        handlers::register_human,
        handlers::register_agent,
        handlers::list_entities,
        handlers::list_projects,
        handlers::get_project,
        handlers::create_project,
        handlers::update_project,
        handlers::approve_project,
        handlers::reject_project,
        handlers::delete_project,
        handlers::list_stages,
        handlers::create_stage,
        handlers::update_stage,
        handlers::delete_stage,
        handlers::create_task,
        handlers::list_tasks,
        handlers::list_available_tasks,
        handlers::list_task_logs,
        handlers::get_task,
        handlers::update_task,
        handlers::delete_task,
        handlers::create_comment,
        handlers::list_task_comments,
    ),
    components(
        schemas(
            HealthResponse,
            EntityResponse,
            RegisteredEntityResponse,
            RegisterEntityRequest,
            ProjectResponse,
            ProjectDetailsResponse,
            StageWithTasksResponse,
            ProjectTaskRequest,
            CreateProjectRequest,
            CreateProjectResponse,
            UpdateProjectRequest,
            StageResponse,
            CreateStageRequest,
            UpdateStageRequest,
            TaskResponse,
            TaskLogResponse,
            CreateTaskRequest,
            UpdateTaskRequest,
            CommentResponse,
            CreateCommentRequest,
            ErrorResponse,
        )
    ),
    modifiers(&ApiKeyScheme),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "entities", description = "Human and agent registration"),
        (name = "projects", description = "Project management and review"),
        (name = "stages", description = "Project pipeline stages"),
        (name = "tasks", description = "Task management endpoints"),
        (name = "comments", description = "Task comments")
    )
)]
pub struct ApiDoc;

/// Create the API router with OpenAPI documentation
pub fn create_router<D: Database + 'static>(state: AppState<D>) -> Router {
    let api = ApiDoc::openapi();

    // System routes (non-generic)
    let system_routes = Router::new().route("/health", get(handlers::health));

    let entity_routes = routes!(D => {
        post "/entities/register/human" => handlers::register_human,
        post "/entities/register/agent" => handlers::register_agent,
        get "/entities" => handlers::list_entities,
    });

    let project_routes = routes!(D => {
        get "/projects" => handlers::list_projects,
        post "/projects" => handlers::create_project,
        get "/projects/{id}" => handlers::get_project,
        patch "/projects/{id}" => handlers::update_project,
        delete "/projects/{id}" => handlers::delete_project,
        post "/projects/{id}/approve" => handlers::approve_project,
        post "/projects/{id}/reject" => handlers::reject_project,
        get "/projects/{id}/stages" => handlers::list_stages,
        post "/projects/{id}/stages" => handlers::create_stage,
        patch "/stages/{id}" => handlers::update_stage,
        delete "/stages/{id}" => handlers::delete_stage,
    });

    let task_routes = routes!(D => {
        post "/tasks" => handlers::create_task,
        get "/tasks" => handlers::list_tasks,
        get "/tasks/available" => handlers::list_available_tasks,
        get "/tasks/{id}" => handlers::get_task,
        patch "/tasks/{id}" => handlers::update_task,
        delete "/tasks/{id}" => handlers::delete_task,
        get "/tasks/{id}/logs" => handlers::list_task_logs,
        get "/tasks/{id}/comments" => handlers::list_task_comments,
        post "/comments" => handlers::create_comment,
    });

    system_routes
        .merge(entity_routes)
        .merge(project_routes)
        .merge(task_routes)
        .merge(Scalar::with_url("/docs", api))
        .with_state(state)
}
