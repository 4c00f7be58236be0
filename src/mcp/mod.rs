//! Model Context Protocol (MCP) server implementation
//!
//! This module provides the MCP adapter served over stdio. It exposes seven
//! tools over the same SQLite store the API server uses.
//!
//! # Architecture
//!
//! - **server**: Main MCP server coordinator and tool router
//! - **tools**: Tool logic per entity type
//!   - ProjectTools: project creation, lookup, and approval
//!   - TaskTools: task creation (direct or delegated) and listing
//!   - planning: the pure `plan_project` template
//! - **error**: the closed set of errors tools return

pub mod error;
pub mod server;
pub mod tools;

#[cfg(test)]
mod error_test;

pub use error::{ToolError, ToolResult};
pub use server::McpServer;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the MCP binary.
///
/// Logs go to stderr: stdout carries the protocol.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kanban=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
