//! MCP server implementation
//!
//! The server owns the tool router and delegates every call to the tool
//! struct responsible for that entity type.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::router::tool::ToolRouter,
    model::{CallToolResult, JsonObject, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};

use super::tools::{
    ApproveProjectParams, CreateProjectParams, CreateTaskParams, GetProjectDetailsParams,
    GetProjectsParams, GetTasksParams, PlanProjectParams, ProjectTools, TaskTools, decode_args,
    input_schema, json_result, plan_project,
};
use crate::db::Database;
use crate::upstream::UpstreamClient;

/// Main MCP server coordinator
///
/// Generic over `D: Database` for zero-cost abstraction (no dynamic dispatch).
/// Holds no store state of its own: every call reads what it needs.
pub struct McpServer<D: Database> {
    project_tools: ProjectTools<D>,
    task_tools: TaskTools<D>,
    pub(crate) tool_router: ToolRouter<Self>,
}

#[tool_router]
impl<D: Database + 'static> McpServer<D> {
    /// Create a new MCP server
    ///
    /// With an upstream client, `create_task` is sent to the API server;
    /// everything else always uses the shared store directly.
    pub fn new(db: impl Into<Arc<D>>, upstream: Option<UpstreamClient>) -> Self {
        let db = db.into();

        Self {
            project_tools: ProjectTools::new(Arc::clone(&db)),
            task_tools: TaskTools::new(db, upstream),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        input_schema = input_schema::<CreateProjectParams>(),
        description = "Create a project owned by entity_id in 'pending' status with the default stages (Backlog, To Do, In Progress, Review, Done). Listed tasks are created in Backlog. All rows are written together or not at all."
    )]
    pub async fn create_project(&self, args: JsonObject) -> Result<CallToolResult, McpError> {
        self.project_tools.create_project(decode_args(args)?).await
    }

    #[tool(
        input_schema = input_schema::<GetProjectsParams>(),
        description = "List projects in creation order, optionally filtered by status."
    )]
    pub async fn get_projects(&self, args: JsonObject) -> Result<CallToolResult, McpError> {
        self.project_tools.get_projects(decode_args(args)?).await
    }

    #[tool(
        input_schema = input_schema::<GetProjectDetailsParams>(),
        description = "Get a project with its ordered stages and the tasks in each stage."
    )]
    pub async fn get_project_details(&self, args: JsonObject) -> Result<CallToolResult, McpError> {
        self.project_tools.get_project_details(decode_args(args)?).await
    }

    #[tool(
        input_schema = input_schema::<CreateTaskParams>(),
        description = "Create a task in the first stage of a project on behalf of entity_id."
    )]
    pub async fn create_task(&self, args: JsonObject) -> Result<CallToolResult, McpError> {
        self.task_tools.create_task(decode_args(args)?).await
    }

    #[tool(
        input_schema = input_schema::<GetTasksParams>(),
        description = "List tasks matching every given filter, in creation order."
    )]
    pub async fn get_tasks(&self, args: JsonObject) -> Result<CallToolResult, McpError> {
        self.task_tools.get_tasks(decode_args(args)?).await
    }

    #[tool(
        input_schema = input_schema::<ApproveProjectParams>(),
        description = "Approve a pending project as entity_id. Fails with InvalidStateError if the project was already reviewed."
    )]
    pub async fn approve_project(&self, args: JsonObject) -> Result<CallToolResult, McpError> {
        self.project_tools.approve_project(decode_args(args)?).await
    }

    #[tool(
        input_schema = input_schema::<PlanProjectParams>(),
        description = "Suggest a project structure for a goal. Returns a fixed five-task template; nothing is written. Pass the result to create_project."
    )]
    pub async fn plan_project(&self, args: JsonObject) -> Result<CallToolResult, McpError> {
        let params: PlanProjectParams = decode_args(args)?;
        json_result(&plan_project(&params)?)
    }
}

#[tool_handler]
impl<D: Database + 'static> ServerHandler for McpServer<D> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build()).with_instructions(
            "Agent Kanban MCP Server - plan, create, and approve projects and tasks. \
             Mutating tools take the acting entity_id.",
        )
    }
}
