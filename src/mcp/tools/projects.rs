//! Project tool implementations
//!
//! Handles the MCP tools for project creation, lookup, and approval.

use std::sync::Arc;

use rmcp::{ErrorData as McpError, model::CallToolResult};
use rmcp::{schemars, schemars::JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};

use super::json_result;
use super::planning::TaskSpec;
use crate::db::validation::{parse_skills, require_id};
use crate::db::{Database, Id, NewProject, NewProjectTask, ProjectRepository, ProjectStatus};
use crate::mcp::error::{ToolError, ToolResult};

// =============================================================================
// Parameter Structs
// =============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateProjectParams {
    #[schemars(description = "ID of the entity creating the project; it becomes the owner")]
    pub entity_id: Id,
    #[schemars(description = "Project name")]
    pub name: String,
    #[schemars(description = "Project description (optional)")]
    pub description: Option<String>,
    #[serde(default)]
    #[schemars(description = "Tasks to create in the first stage (optional)")]
    pub tasks: Vec<TaskSpec>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetProjectsParams {
    #[schemars(description = "Filter by review status: 'pending', 'approved' or 'rejected'")]
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetProjectDetailsParams {
    #[schemars(description = "Project ID")]
    pub project_id: Id,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ApproveProjectParams {
    #[schemars(description = "ID of the entity approving the project")]
    pub entity_id: Id,
    #[schemars(description = "Project ID to approve")]
    pub project_id: Id,
}

// =============================================================================
// Project Tools
// =============================================================================

/// Project management tools
///
/// Generic over `D: Database` for zero-cost abstraction.
pub struct ProjectTools<D: Database> {
    db: Arc<D>,
}

impl<D: Database> Clone for ProjectTools<D> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

impl<D: Database> ProjectTools<D> {
    /// Create new ProjectTools with database
    pub fn new(db: Arc<D>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, params), fields(entity_id = params.entity_id))]
    pub async fn create_project(
        &self,
        params: CreateProjectParams,
    ) -> Result<CallToolResult, McpError> {
        let entity_id = require_id("entity_id", params.entity_id).map_err(ToolError::from)?;

        let project = NewProject {
            name: params.name,
            description: params.description.unwrap_or_default(),
            owner_id: entity_id,
            tasks: params
                .tasks
                .iter()
                .map(|t| NewProjectTask {
                    title: t.title.clone(),
                    description: t.description.clone(),
                    required_skills: parse_skills(&t.required_skills),
                    priority: t.priority,
                })
                .collect(),
        };

        let created = self
            .db
            .projects()
            .create(&project)
            .await
            .map_err(ToolError::from)?;
        info!(project_id = created.project.id, "project created");

        json_result(&json!({
            "project_id": created.project.id,
            "project": created.project,
            "stage_ids": created.stage_ids,
            "task_ids": created.task_ids,
        }))
    }

    pub async fn get_projects(
        &self,
        params: GetProjectsParams,
    ) -> Result<CallToolResult, McpError> {
        let status = parse_status(params.status.as_deref())?;

        let projects = self
            .db
            .projects()
            .list(status)
            .await
            .map_err(ToolError::from)?;

        json_result(&projects)
    }

    pub async fn get_project_details(
        &self,
        params: GetProjectDetailsParams,
    ) -> Result<CallToolResult, McpError> {
        let details = self
            .db
            .projects()
            .details(params.project_id)
            .await
            .map_err(ToolError::from)?;

        json_result(&details)
    }

    #[instrument(skip(self, params), fields(entity_id = params.entity_id, project_id = params.project_id))]
    pub async fn approve_project(
        &self,
        params: ApproveProjectParams,
    ) -> Result<CallToolResult, McpError> {
        let entity_id = require_id("entity_id", params.entity_id).map_err(ToolError::from)?;

        let project = self
            .db
            .projects()
            .review(params.project_id, entity_id, ProjectStatus::Approved)
            .await
            .map_err(ToolError::from)?;
        info!("project approved");

        json_result(&project)
    }
}

fn parse_status(raw: Option<&str>) -> ToolResult<Option<ProjectStatus>> {
    raw.map(|s| s.trim().parse::<ProjectStatus>())
        .transpose()
        .map_err(ToolError::validation)
}
