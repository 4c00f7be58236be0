//! Error shaping for MCP tools.
//!
//! Every failure a tool can hit is classified into one of five kinds before
//! it reaches the client. Storage and transport details are logged and
//! replaced with a generic message.

use miette::Diagnostic;
use rmcp::ErrorData as McpError;
use rmcp::model::ErrorCode;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::db::DbError;
use crate::upstream::UpstreamError;

/// Closed set of errors returned by tools.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("{message}")]
    #[diagnostic(code(kanban::mcp::validation))]
    Validation { message: String },

    #[error("{message}")]
    #[diagnostic(code(kanban::mcp::not_found))]
    NotFound { message: String },

    #[error("{message}")]
    #[diagnostic(code(kanban::mcp::invalid_state))]
    InvalidState { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(kanban::mcp::conflict),
        help("Another writer changed the data first. Re-read and retry.")
    )]
    Conflict { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(kanban::mcp::upstream_unavailable),
        help("The data store or API server could not be reached. The call is safe to retry.")
    )]
    UpstreamUnavailable { message: String },
}

impl ToolError {
    pub fn validation(message: impl Into<String>) -> Self {
        ToolError::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ToolError::NotFound {
            message: message.into(),
        }
    }

    /// Name of the error kind as seen by clients.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::Validation { .. } => "ValidationError",
            ToolError::NotFound { .. } => "NotFoundError",
            ToolError::InvalidState { .. } => "InvalidStateError",
            ToolError::Conflict { .. } => "ConflictError",
            ToolError::UpstreamUnavailable { .. } => "UpstreamUnavailableError",
        }
    }

    fn message(&self) -> &str {
        match self {
            ToolError::Validation { message }
            | ToolError::NotFound { message }
            | ToolError::InvalidState { message }
            | ToolError::Conflict { message }
            | ToolError::UpstreamUnavailable { message } => message,
        }
    }
}

impl From<DbError> for ToolError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ToolError::NotFound {
                message: err.to_string(),
            },
            DbError::Validation { message } => ToolError::Validation { message },
            DbError::InvalidState { message } => ToolError::InvalidState { message },
            DbError::Busy { message } | DbError::Constraint { message } => {
                error!(%message, "write rejected by the data store");
                ToolError::Conflict {
                    message: "the data changed concurrently; re-read and retry".to_string(),
                }
            }
            DbError::Database { .. } | DbError::Migration { .. } | DbError::Connection { .. } => {
                error!(error = %err, "data store failure");
                ToolError::UpstreamUnavailable {
                    message: "the data store is unavailable".to_string(),
                }
            }
        }
    }
}

impl From<UpstreamError> for ToolError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Rejected {
                status,
                kind,
                message,
            } => match (status, kind.as_deref()) {
                (401, _) => ToolError::validation("credential rejected by the API server"),
                (404, _) => ToolError::NotFound { message },
                (409, Some("conflict")) => ToolError::Conflict { message },
                (409, _) => ToolError::InvalidState { message },
                _ => ToolError::Validation { message },
            },
            UpstreamError::Unavailable { .. }
            | UpstreamError::InvalidResponse { .. }
            | UpstreamError::Client { .. } => {
                error!(error = %err, "API server call failed");
                ToolError::UpstreamUnavailable {
                    message: "the API server is unavailable".to_string(),
                }
            }
        }
    }
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let code = match err {
            ToolError::Validation { .. } => ErrorCode::INVALID_PARAMS,
            ToolError::NotFound { .. } => ErrorCode::RESOURCE_NOT_FOUND,
            ToolError::InvalidState { .. } | ToolError::Conflict { .. } => {
                ErrorCode::INVALID_REQUEST
            }
            ToolError::UpstreamUnavailable { .. } => ErrorCode::INTERNAL_ERROR,
        };
        let data = json!({ "kind": err.kind(), "message": err.message() });
        McpError::new(code, err.message().to_string(), Some(data))
    }
}

pub type ToolResult<T> = Result<T, ToolError>;
