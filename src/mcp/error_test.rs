//! Tests for tool error classification

use rmcp::ErrorData as McpError;
use rmcp::model::ErrorCode;

use crate::db::DbError;
use crate::mcp::error::ToolError;
use crate::upstream::UpstreamError;

#[test]
fn store_errors_map_to_tool_kinds() {
    let cases = [
        (DbError::not_found("Project", 7), "NotFoundError"),
        (DbError::validation("bad"), "ValidationError"),
        (
            DbError::InvalidState {
                message: "already approved".to_string(),
            },
            "InvalidStateError",
        ),
        (
            DbError::Busy {
                message: "database is locked".to_string(),
            },
            "ConflictError",
        ),
        (
            DbError::Constraint {
                message: "FOREIGN KEY constraint failed".to_string(),
            },
            "ConflictError",
        ),
        (
            DbError::Connection {
                message: "pool timed out".to_string(),
            },
            "UpstreamUnavailableError",
        ),
    ];

    for (db_err, kind) in cases {
        assert_eq!(ToolError::from(db_err).kind(), kind);
    }
}

#[test]
fn engine_text_never_reaches_the_client() {
    let err = ToolError::from(DbError::Database {
        message: "no such table: tasks_v2".to_string(),
    });
    assert!(!err.to_string().contains("tasks_v2"));

    let err = ToolError::from(DbError::Busy {
        message: "database is locked".to_string(),
    });
    assert!(!err.to_string().contains("locked"));
}

#[test]
fn upstream_rejections_follow_status() {
    let rejected = |status: u16, kind: Option<&str>| UpstreamError::Rejected {
        status,
        kind: kind.map(str::to_string),
        message: "nope".to_string(),
    };

    assert_eq!(ToolError::from(rejected(400, None)).kind(), "ValidationError");
    assert_eq!(ToolError::from(rejected(401, None)).kind(), "ValidationError");
    assert_eq!(ToolError::from(rejected(422, None)).kind(), "ValidationError");
    assert_eq!(ToolError::from(rejected(404, None)).kind(), "NotFoundError");
    assert_eq!(
        ToolError::from(rejected(409, Some("invalid_state"))).kind(),
        "InvalidStateError"
    );
    assert_eq!(
        ToolError::from(rejected(409, Some("conflict"))).kind(),
        "ConflictError"
    );
    assert_eq!(
        ToolError::from(UpstreamError::Unavailable {
            message: "connection refused".to_string()
        })
        .kind(),
        "UpstreamUnavailableError"
    );
}

#[test]
fn mcp_error_carries_kind_and_message() {
    let err: McpError = ToolError::InvalidState {
        message: "project 3 is already approved".to_string(),
    }
    .into();

    assert_eq!(err.code, ErrorCode::INVALID_REQUEST);
    let data = err.data.expect("error data");
    assert_eq!(data["kind"], "InvalidStateError");
    assert_eq!(data["message"], "project 3 is already approved");
}
