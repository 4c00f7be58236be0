//! Database error types.
//!
//! This module provides abstracted error types for database operations.
//! It uses miette for fancy diagnostic output and thiserror for derive macros.
//! The error types are storage-backend agnostic: the SQLite layer classifies
//! engine failures into these variants before they leave `db::sqlite`.

use miette::Diagnostic;
use thiserror::Error;

/// Database operation errors.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error("Entity not found: {entity_type} with id '{id}'")]
    #[diagnostic(code(kanban::db::not_found))]
    NotFound { entity_type: String, id: String },

    #[error("Validation error: {message}")]
    #[diagnostic(code(kanban::db::validation_error))]
    Validation { message: String },

    #[error("Invalid state: {message}")]
    #[diagnostic(code(kanban::db::invalid_state))]
    InvalidState { message: String },

    /// Another writer holds the database lock past the busy timeout, or the
    /// transaction snapshot went stale under a concurrent commit.
    #[error("Write conflict: {message}")]
    #[diagnostic(
        code(kanban::db::busy),
        help("Another process is writing to the same database. Retry the operation.")
    )]
    Busy { message: String },

    #[error("Constraint violation: {message}")]
    #[diagnostic(code(kanban::db::constraint))]
    Constraint { message: String },

    #[error("Database error: {message}")]
    #[diagnostic(code(kanban::db::database_error))]
    Database { message: String },

    #[error("Migration error: {message}")]
    #[diagnostic(code(kanban::db::migration_error))]
    Migration { message: String },

    #[error("Connection error: {message}")]
    #[diagnostic(code(kanban::db::connection_error))]
    Connection { message: String },
}

impl DbError {
    pub(crate) fn not_found(entity_type: &str, id: impl ToString) -> Self {
        DbError::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        DbError::Validation {
            message: message.into(),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
