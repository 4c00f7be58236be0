//! Shared helper functions for SQLite repositories.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use crate::db::utils::decode_list;
use crate::db::{Comment, DbError, DbResult, Entity, Id, Project, Stage, Task, TaskLog};

// SQLite primary result codes; extended codes carry these in the low byte.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;
const SQLITE_CONSTRAINT: i32 = 19;

pub(crate) const ENTITY_COLUMNS: &str = "id, name, kind, skills, api_key, is_active, created_at";
pub(crate) const PROJECT_COLUMNS: &str =
    "id, name, description, status, owner_id, reviewer_id, created_at, updated_at";
pub(crate) const STAGE_COLUMNS: &str = "id, project_id, name, description, position, created_at";
pub(crate) const TASK_COLUMNS: &str = "id, project_id, stage_id, title, description, required_skills, \
     priority, status, assignee_id, created_at, updated_at, completed_at";
pub(crate) const COMMENT_COLUMNS: &str = "id, task_id, author_id, content, created_at";
pub(crate) const TASK_LOG_COLUMNS: &str = "id, task_id, kind, message, created_at";

/// Classify an engine error.
///
/// Lock contention and constraint failures get their own variants so callers
/// can tell a lost race from a broken store.
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> DbError {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err
                .code()
                .and_then(|c| c.parse::<i32>().ok())
                .map(|c| c & 0xff);
            let message = db_err.message().to_string();
            match code {
                Some(SQLITE_BUSY) | Some(SQLITE_LOCKED) => DbError::Busy { message },
                Some(SQLITE_CONSTRAINT) => DbError::Constraint { message },
                _ => DbError::Database { message },
            }
        }
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_) => DbError::Connection {
            message: err.to_string(),
        },
        other => DbError::Database {
            message: other.to_string(),
        },
    }
}

/// Bump `updated_at` on a row inside a transaction.
///
/// Used as the first statement of every write transaction that modifies an
/// existing row: it takes the write lock before anything is read, so the
/// reads that follow cannot be invalidated by another writer. Returns
/// `false` when the row does not exist.
pub(crate) async fn touch(
    conn: &mut SqliteConnection,
    table: &'static str,
    id: Id,
    now: &str,
) -> DbResult<bool> {
    let result = sqlx::query(&format!("UPDATE {} SET updated_at = ? WHERE id = ?", table))
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    Ok(result.rows_affected() > 0)
}

/// Whether an active entity with this id exists.
pub(crate) async fn entity_exists(conn: &mut SqliteConnection, id: Id) -> DbResult<bool> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM entities WHERE id = ? AND is_active = 1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;
    Ok(found.is_some())
}

/// Whether a row with this id exists in `table`.
pub(crate) async fn row_exists(
    conn: &mut SqliteConnection,
    table: &'static str,
    id: Id,
) -> DbResult<bool> {
    let found: Option<i64> = sqlx::query_scalar(&format!("SELECT 1 FROM {} WHERE id = ?", table))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    Ok(found.is_some())
}

fn column<'r, T>(row: &'r SqliteRow, name: &str) -> DbResult<T>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name).map_err(map_sqlx_error)
}

fn parsed<T: std::str::FromStr<Err = String>>(row: &SqliteRow, name: &str) -> DbResult<T> {
    let raw: String = column(row, name)?;
    raw.parse()
        .map_err(|message: String| DbError::Database { message })
}

pub(crate) fn entity_from_row(row: &SqliteRow) -> DbResult<Entity> {
    let skills: String = column(row, "skills")?;
    Ok(Entity {
        id: column(row, "id")?,
        name: column(row, "name")?,
        kind: parsed(row, "kind")?,
        skills: decode_list(&skills),
        api_key: column(row, "api_key")?,
        is_active: column(row, "is_active")?,
        created_at: column(row, "created_at")?,
    })
}

pub(crate) fn project_from_row(row: &SqliteRow) -> DbResult<Project> {
    Ok(Project {
        id: column(row, "id")?,
        name: column(row, "name")?,
        description: column(row, "description")?,
        status: parsed(row, "status")?,
        owner_id: column(row, "owner_id")?,
        reviewer_id: column(row, "reviewer_id")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}

pub(crate) fn stage_from_row(row: &SqliteRow) -> DbResult<Stage> {
    Ok(Stage {
        id: column(row, "id")?,
        project_id: column(row, "project_id")?,
        name: column(row, "name")?,
        description: column(row, "description")?,
        position: column(row, "position")?,
        created_at: column(row, "created_at")?,
    })
}

pub(crate) fn task_from_row(row: &SqliteRow) -> DbResult<Task> {
    let skills: String = column(row, "required_skills")?;
    Ok(Task {
        id: column(row, "id")?,
        project_id: column(row, "project_id")?,
        stage_id: column(row, "stage_id")?,
        title: column(row, "title")?,
        description: column(row, "description")?,
        required_skills: decode_list(&skills),
        priority: column(row, "priority")?,
        status: parsed(row, "status")?,
        assignee_id: column(row, "assignee_id")?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
        completed_at: column(row, "completed_at")?,
    })
}

pub(crate) fn task_log_from_row(row: &SqliteRow) -> DbResult<TaskLog> {
    Ok(TaskLog {
        id: column(row, "id")?,
        task_id: column(row, "task_id")?,
        kind: parsed(row, "kind")?,
        message: column(row, "message")?,
        created_at: column(row, "created_at")?,
    })
}

pub(crate) fn comment_from_row(row: &SqliteRow) -> DbResult<Comment> {
    Ok(Comment {
        id: column(row, "id")?,
        task_id: column(row, "task_id")?,
        author_id: column(row, "author_id")?,
        content: column(row, "content")?,
        created_at: column(row, "created_at")?,
    })
}
