//! Project planning template.
//!
//! `plan_project` is a pure function of its input: no store access, no
//! clock, no randomness. The same input always yields the same plan.

use rmcp::schemars;
use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::mcp::error::{ToolError, ToolResult};

const DEFAULT_DESCRIPTION: &str = "AI-generated project plan";
const DEFAULT_IMPLEMENTATION_SKILLS: &str = "development";
const INSTRUCTIONS: &str =
    "Use the 'create_project' tool with the above structure to create the planned project";

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlanProjectParams {
    #[schemars(description = "What you want to accomplish")]
    pub goal: String,
    #[schemars(description = "Project scope and constraints (optional)")]
    pub scope: Option<String>,
    #[schemars(description = "Available skills or resources, comma-separated (optional)")]
    pub skills_available: Option<String>,
}

/// A task definition, as accepted by `create_project` and suggested by
/// `plan_project`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TaskSpec {
    #[schemars(description = "Task title")]
    pub title: String,
    #[serde(default)]
    #[schemars(description = "Task description (optional)")]
    pub description: String,
    #[serde(default)]
    #[schemars(description = "Required skills, comma-separated (e.g. 'ai,design'). Optional.")]
    pub required_skills: String,
    #[serde(default)]
    #[schemars(description = "Priority from 0 (lowest) to 10 (highest). Defaults to 0.")]
    pub priority: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedProject {
    pub name: String,
    pub description: String,
    pub goal: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectPlan {
    pub project: PlannedProject,
    pub suggested_tasks: Vec<TaskSpec>,
    pub instructions: String,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn spec(title: &str, description: &str, required_skills: &str, priority: i64) -> TaskSpec {
    TaskSpec {
        title: title.to_string(),
        description: description.to_string(),
        required_skills: required_skills.to_string(),
        priority,
    }
}

/// Build the five-step plan template for `goal`.
pub fn plan_project(params: &PlanProjectParams) -> ToolResult<ProjectPlan> {
    let goal = params.goal.trim();
    if goal.is_empty() {
        return Err(ToolError::validation("goal must not be empty"));
    }
    let description = non_blank(params.scope.as_deref()).unwrap_or(DEFAULT_DESCRIPTION);
    let implementation_skills =
        non_blank(params.skills_available.as_deref()).unwrap_or(DEFAULT_IMPLEMENTATION_SKILLS);

    Ok(ProjectPlan {
        project: PlannedProject {
            name: format!("Project: {}", goal),
            description: description.to_string(),
            goal: goal.to_string(),
        },
        suggested_tasks: vec![
            spec(
                "Define Requirements",
                "Clearly define all project requirements and constraints",
                "planning,analysis",
                10,
            ),
            spec(
                "Design Architecture",
                "Design the system architecture and data models",
                "design,architecture",
                9,
            ),
            spec(
                "Implementation",
                "Implement the core functionality",
                implementation_skills,
                8,
            ),
            spec(
                "Testing",
                "Write and run comprehensive tests",
                "testing,qa",
                7,
            ),
            spec(
                "Documentation",
                "Create user and technical documentation",
                "documentation,writing",
                6,
            ),
        ],
        instructions: INSTRUCTIONS.to_string(),
    })
}
