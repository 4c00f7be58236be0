//! Input rules shared by every write path.
//!
//! The API server and the MCP adapter both funnel writes through the
//! repositories, which call into this module before touching the store.
//! Keeping the rules in one place means the two processes cannot drift apart
//! on what they accept.

use crate::db::{DbError, DbResult, Id, NewProjectTask};

/// Lowest accepted task priority.
pub const MIN_PRIORITY: i64 = 0;
/// Highest accepted task priority.
pub const MAX_PRIORITY: i64 = 10;

/// Pipeline created with every project, in position order.
pub const DEFAULT_STAGES: &[(&str, &str)] = &[
    ("Backlog", "Tasks to be done"),
    ("To Do", "Ready to start"),
    ("In Progress", "Currently being worked on"),
    ("Review", "Awaiting review"),
    ("Done", "Completed tasks"),
];

/// Reject out-of-range priorities. Values are never clamped.
pub fn validate_priority(priority: i64) -> DbResult<i64> {
    if (MIN_PRIORITY..=MAX_PRIORITY).contains(&priority) {
        Ok(priority)
    } else {
        Err(DbError::validation(format!(
            "priority must be between {} and {}, got {}",
            MIN_PRIORITY, MAX_PRIORITY, priority
        )))
    }
}

/// Trim a required text field and reject it when blank.
pub fn require_text(field: &str, value: &str) -> DbResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DbError::validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

/// Ids come from clients as plain integers; non-positive ids never exist.
pub fn require_id(field: &str, id: Id) -> DbResult<Id> {
    if id <= 0 {
        return Err(DbError::validation(format!(
            "{} must be a positive integer",
            field
        )));
    }
    Ok(id)
}

/// Split a comma-joined skill list, trimming entries and dropping blanks.
///
/// Order is preserved so a task reads back with the skills it was given.
pub fn parse_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalize a task definition before it is written.
pub fn validate_new_task(task: &NewProjectTask) -> DbResult<NewProjectTask> {
    Ok(NewProjectTask {
        title: require_text("title", &task.title)?,
        description: task.description.trim().to_string(),
        required_skills: task
            .required_skills
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        priority: validate_priority(task.priority)?,
    })
}
