//! MCP tool implementations
//!
//! This module contains tool handlers organized by entity type. The server
//! exposes them through one router; each struct here owns the logic.

pub mod planning;
mod projects;
mod tasks;

#[cfg(test)]
mod planning_test;
#[cfg(test)]
mod projects_test;

use std::sync::Arc;

use rmcp::ErrorData as McpError;
use rmcp::handler::server::common::schema_for_type;
use rmcp::model::{CallToolResult, Content, JsonObject};
use rmcp::schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::{ToolError, ToolResult};

pub use planning::{PlanProjectParams, ProjectPlan, TaskSpec, plan_project};
pub use projects::{
    ApproveProjectParams, CreateProjectParams, GetProjectDetailsParams, GetProjectsParams,
    ProjectTools,
};
pub use tasks::{CreateTaskParams, GetTasksParams, TaskTools};

/// Advertised argument schema of a tool.
pub(crate) fn input_schema<T: JsonSchema + 'static>() -> Arc<JsonObject> {
    schema_for_type::<T>()
}

/// Decode tool arguments. Missing or mistyped fields are a validation error.
pub(crate) fn decode_args<T: DeserializeOwned>(args: JsonObject) -> ToolResult<T> {
    serde_json::from_value(serde_json::Value::Object(args))
        .map_err(|e| ToolError::validation(format!("invalid arguments: {}", e)))
}

/// Wrap a value as a single pretty-printed JSON text block.
pub(crate) fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}
