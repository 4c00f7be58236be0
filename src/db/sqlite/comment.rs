//! SQLite CommentRepository implementation.

use sqlx::SqlitePool;

use super::helpers::{
    COMMENT_COLUMNS, comment_from_row, entity_exists, map_sqlx_error, row_exists, touch,
};
use crate::db::utils::current_timestamp;
use crate::db::validation::require_text;
use crate::db::{Comment, CommentRepository, DbError, DbResult, Id, NewComment};

/// SQLx-backed comment repository.
pub struct SqliteCommentRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> CommentRepository for SqliteCommentRepository<'a> {
    async fn create(&self, comment: &NewComment) -> DbResult<Comment> {
        let content = require_text("content", &comment.content)?;
        let now = current_timestamp();

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        if !touch(&mut tx, "tasks", comment.task_id, &now).await? {
            return Err(DbError::not_found("Task", comment.task_id));
        }
        if !entity_exists(&mut tx, comment.author_id).await? {
            return Err(DbError::not_found("Entity", comment.author_id));
        }

        let result = sqlx::query(
            "INSERT INTO comments (task_id, author_id, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(comment.task_id)
        .bind(comment.author_id)
        .bind(&content)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(Comment {
            id: result.last_insert_rowid(),
            task_id: comment.task_id,
            author_id: comment.author_id,
            content,
            created_at: now,
        })
    }

    async fn list(&self, task_id: Id) -> DbResult<Vec<Comment>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM comments WHERE task_id = ? ORDER BY id",
            COMMENT_COLUMNS
        ))
        .bind(task_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if rows.is_empty() && !row_exists(&mut tx, "tasks", task_id).await? {
            return Err(DbError::not_found("Task", task_id));
        }
        tx.commit().await.map_err(map_sqlx_error)?;

        rows.iter().map(comment_from_row).collect()
    }
}
