//! Client for the kanban API server.
//!
//! The MCP adapter uses this in delegated mode: instead of writing a task row
//! itself it sends one authenticated request to the API server and treats
//! that single call as the whole operation.

mod client;
mod error;

#[cfg(test)]
mod client_test;

pub use client::UpstreamClient;
pub use error::{UpstreamError, UpstreamResult};
