//! Database abstraction layer.
//!
//! This module provides trait-based abstractions for data access so the API
//! server and the MCP adapter run the same operations against the same
//! store.
//!
//! # Architecture
//!
//! - `error`: Storage-agnostic error types
//! - `models`: Domain entities (Entity, Project, Stage, Task, Comment)
//! - `repository`: Trait definitions for data access
//! - `validation`: Input rules shared by every write path
//! - `sqlite`: SQLx implementation over a shared SQLite file

mod error;
mod models;
mod repository;
pub mod sqlite;
pub mod utils;
pub mod validation;

#[cfg(test)]
mod error_test;
#[cfg(test)]
mod models_test;

pub use error::{DbError, DbResult};
pub use models::*;
pub use repository::*;
pub use sqlite::SqliteDatabase;
