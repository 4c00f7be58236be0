//! SQLite implementation of the database traits.
//!
//! This module provides a SQLx-backed implementation of the repository
//! traits defined in the parent module.

mod comment;
mod connection;
mod entity;
mod helpers;
mod project;
mod stage;
mod task;

#[cfg(test)]
mod task_test;

pub use comment::SqliteCommentRepository;
pub use connection::{BUSY_TIMEOUT, SqliteDatabase};
pub use entity::SqliteEntityRepository;
pub use project::SqliteProjectRepository;
pub use stage::SqliteStageRepository;
pub use task::SqliteTaskRepository;
