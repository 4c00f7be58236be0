//! Task tool implementations
//!
//! `create_task` writes directly to the shared store, or goes through the
//! API server when an upstream client is configured. Reads are always local.

use std::sync::Arc;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use rmcp::{schemars, schemars::JsonSchema};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::json_result;
use crate::api::CreateTaskRequest;
use crate::db::validation::{parse_skills, require_id, validate_new_task};
use crate::db::{
    Database, EntityRepository, Id, NewProjectTask, NewTask, TaskQuery, TaskRepository, TaskStatus,
};
use crate::mcp::error::{ToolError, ToolResult};
use crate::upstream::UpstreamClient;

// =============================================================================
// Parameter Structs
// =============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateTaskParams {
    #[schemars(description = "ID of the entity creating the task")]
    pub entity_id: Id,
    #[schemars(description = "Project ID the task belongs to")]
    pub project_id: Id,
    #[schemars(description = "Task title")]
    pub title: String,
    #[schemars(description = "Task description (optional)")]
    pub description: Option<String>,
    #[schemars(description = "Required skills, comma-separated (e.g. 'ai,design'). Optional.")]
    pub required_skills: Option<String>,
    #[schemars(description = "Priority from 0 (lowest) to 10 (highest). Defaults to 0.")]
    pub priority: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetTasksParams {
    #[schemars(description = "Filter by project ID (optional)")]
    pub project_id: Option<Id>,
    #[schemars(
        description = "Filter by status: 'pending', 'in_progress', 'blocked', 'completed' ('done' is accepted as 'completed')"
    )]
    pub status: Option<String>,
}

// =============================================================================
// Task Tools
// =============================================================================

pub struct TaskTools<D: Database> {
    db: Arc<D>,
    upstream: Option<UpstreamClient>,
}

impl<D: Database> Clone for TaskTools<D> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            upstream: self.upstream.clone(),
        }
    }
}

impl<D: Database> TaskTools<D> {
    pub fn new(db: Arc<D>, upstream: Option<UpstreamClient>) -> Self {
        Self { db, upstream }
    }

    #[instrument(
        skip(self, params),
        fields(entity_id = params.entity_id, project_id = params.project_id, delegated = self.upstream.is_some())
    )]
    pub async fn create_task(
        &self,
        params: CreateTaskParams,
    ) -> Result<CallToolResult, McpError> {
        let entity_id = require_id("entity_id", params.entity_id).map_err(ToolError::from)?;
        let project_id = require_id("project_id", params.project_id).map_err(ToolError::from)?;

        let fields = validate_new_task(&NewProjectTask {
            title: params.title,
            description: params.description.unwrap_or_default(),
            required_skills: parse_skills(params.required_skills.as_deref().unwrap_or_default()),
            priority: params.priority.unwrap_or_default(),
        })
        .map_err(ToolError::from)?;

        let entity = self
            .db
            .entities()
            .get(entity_id)
            .await
            .map_err(ToolError::from)?;
        if !entity.is_active {
            return Err(ToolError::not_found(format!("entity {} is not active", entity_id)).into());
        }

        let task = match &self.upstream {
            Some(client) => {
                let request = CreateTaskRequest {
                    project_id,
                    title: fields.title,
                    description: fields.description,
                    required_skills: fields.required_skills,
                    priority: fields.priority,
                };
                client
                    .create_task(&entity.api_key, &request)
                    .await
                    .map_err(ToolError::from)?
            }
            None => self
                .db
                .tasks()
                .create(&NewTask {
                    project_id,
                    title: fields.title,
                    description: fields.description,
                    required_skills: fields.required_skills,
                    priority: fields.priority,
                })
                .await
                .map_err(ToolError::from)?,
        };
        info!(task_id = task.id, "task created");

        json_result(&task)
    }

    pub async fn get_tasks(
        &self,
        params: GetTasksParams,
    ) -> Result<CallToolResult, McpError> {
        let query = TaskQuery {
            project_id: params.project_id,
            stage_id: None,
            status: parse_status(params.status.as_deref())?,
        };

        let tasks = self
            .db
            .tasks()
            .list(&query)
            .await
            .map_err(ToolError::from)?;

        json_result(&tasks)
    }
}

fn parse_status(raw: Option<&str>) -> ToolResult<Option<TaskStatus>> {
    raw.map(|s| s.trim().parse::<TaskStatus>())
        .transpose()
        .map_err(ToolError::validation)
}
