//! Tests for database error types.

use crate::db::DbError;
use miette::Diagnostic;

#[test]
fn not_found_message_names_entity_and_id() {
    let err = DbError::not_found("Project", 42);
    assert_eq!(err.to_string(), "Entity not found: Project with id '42'");
}

#[test]
fn validation_message_is_preserved() {
    let err = DbError::validation("priority must be between 0 and 10");
    assert_eq!(
        err.to_string(),
        "Validation error: priority must be between 0 and 10"
    );
}

#[test]
fn busy_carries_retry_help() {
    let err = DbError::Busy {
        message: "database is locked".to_string(),
    };
    let help = err.help().map(|h| h.to_string()).unwrap_or_default();
    assert!(help.contains("Retry"));
    assert_eq!(
        err.code().map(|c| c.to_string()),
        Some("kanban::db::busy".to_string())
    );
}
