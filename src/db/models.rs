//! Domain models for the kanban database.
//!
//! These models are storage-agnostic and represent the core entities shared
//! by the API server and the MCP adapter.

use serde::{Deserialize, Serialize};

/// Integer row id used for all entities.
pub type Id = i64;

// =============================================================================
// Entities
// =============================================================================

/// Whether an identity is a person or an AI agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Human,
    Agent,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Human => write!(f, "human"),
            EntityKind::Agent => write!(f, "agent"),
        }
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(EntityKind::Human),
            "agent" => Ok(EntityKind::Agent),
            _ => Err(format!("Unknown entity kind: {}", s)),
        }
    }
}

/// A human or agent identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: Id,
    pub name: String,
    pub kind: EntityKind,
    pub skills: Vec<String>,
    /// Credential presented in the `X-API-Key` header. Never serialized.
    #[serde(skip_serializing, default)]
    pub api_key: String,
    pub is_active: bool,
    pub created_at: String,
}

/// Input for registering an entity.
#[derive(Debug, Clone)]
pub struct NewEntity {
    pub name: String,
    pub kind: EntityKind,
    pub skills: Vec<String>,
}

// =============================================================================
// Projects
// =============================================================================

/// Review status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectStatus::Pending => write!(f, "pending"),
            ProjectStatus::Approved => write!(f, "approved"),
            ProjectStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ProjectStatus::Pending),
            "approved" => Ok(ProjectStatus::Approved),
            "rejected" => Ok(ProjectStatus::Rejected),
            _ => Err(format!(
                "Invalid project status: {} (expected pending, approved or rejected)",
                s
            )),
        }
    }
}

/// Project summary row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: Id,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub owner_id: Id,
    pub reviewer_id: Option<Id>,
    pub created_at: String,
    pub updated_at: String,
}

/// A task to create together with its project.
#[derive(Debug, Clone, Default)]
pub struct NewProjectTask {
    pub title: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub priority: i64,
}

/// Input for creating a project with its default stage pipeline.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub owner_id: Id,
    pub tasks: Vec<NewProjectTask>,
}

/// Everything written by a single project creation.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedProject {
    pub project: Project,
    pub stage_ids: Vec<Id>,
    pub task_ids: Vec<Id>,
}

/// A stage together with the tasks it currently holds.
#[derive(Debug, Clone, Serialize)]
pub struct StageDetails {
    #[serde(flatten)]
    pub stage: Stage,
    pub tasks: Vec<Task>,
}

/// Full project view: summary, ordered stages, and their tasks.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetails {
    #[serde(flatten)]
    pub project: Project,
    pub stages: Vec<StageDetails>,
}

/// Edit of a project's descriptive fields. Review status is not editable.
#[derive(Debug, Clone, Default)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ProjectDetails {
    /// All tasks across stages, in stage order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.stages.iter().flat_map(|s| s.tasks.iter())
    }
}

// =============================================================================
// Stages
// =============================================================================

/// One step of a project's pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: Id,
    pub project_id: Id,
    pub name: String,
    pub description: String,
    pub position: i64,
    pub created_at: String,
}

/// Input for appending a stage to a project.
#[derive(Debug, Clone)]
pub struct NewStage {
    pub name: String,
    pub description: String,
}

/// Rename or redescribe a stage. Position is fixed.
#[derive(Debug, Clone, Default)]
pub struct StageUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

// =============================================================================
// Tasks
// =============================================================================

/// Status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Blocked,
    #[serde(alias = "done")]
    Completed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::InProgress => write!(f, "in_progress"),
            TaskStatus::Blocked => write!(f, "blocked"),
            TaskStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "blocked" => Ok(TaskStatus::Blocked),
            "completed" | "done" => Ok(TaskStatus::Completed),
            _ => Err(format!(
                "Invalid task status: {} (expected pending, in_progress, blocked or completed)",
                s
            )),
        }
    }
}

/// A unit of work inside a project stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Id,
    pub project_id: Id,
    pub stage_id: Id,
    pub title: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub priority: i64,
    pub status: TaskStatus,
    pub assignee_id: Option<Id>,
    pub created_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
}

/// Input for creating a task in a project's first stage.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub project_id: Id,
    pub title: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub priority: i64,
}

/// Partial update of a task. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub required_skills: Option<Vec<String>>,
    pub priority: Option<i64>,
    pub status: Option<TaskStatus>,
    pub stage_id: Option<Id>,
    /// `Some(None)` clears the assignee.
    pub assignee_id: Option<Option<Id>>,
}

/// Filters for listing tasks. All filters combine with AND.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub project_id: Option<Id>,
    pub stage_id: Option<Id>,
    pub status: Option<TaskStatus>,
}

/// What a task log entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskLogKind {
    Created,
    Status,
    Stage,
    Assignment,
}

impl std::fmt::Display for TaskLogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskLogKind::Created => write!(f, "created"),
            TaskLogKind::Status => write!(f, "status"),
            TaskLogKind::Stage => write!(f, "stage"),
            TaskLogKind::Assignment => write!(f, "assignment"),
        }
    }
}

impl std::str::FromStr for TaskLogKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(TaskLogKind::Created),
            "status" => Ok(TaskLogKind::Status),
            "stage" => Ok(TaskLogKind::Stage),
            "assignment" => Ok(TaskLogKind::Assignment),
            _ => Err(format!("Unknown task log kind: {}", s)),
        }
    }
}

/// Activity entry written alongside a task change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLog {
    pub id: Id,
    pub task_id: Id,
    pub kind: TaskLogKind,
    pub message: String,
    pub created_at: String,
}

// =============================================================================
// Comments
// =============================================================================

/// Append-only note on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Id,
    pub task_id: Id,
    pub author_id: Id,
    pub content: String,
    pub created_at: String,
}

/// Input for appending a comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub task_id: Id,
    pub author_id: Id,
    pub content: String,
}
