//! SQLite TaskRepository implementation.

use sqlx::{SqliteConnection, SqlitePool};

use super::helpers::{
    TASK_COLUMNS, TASK_LOG_COLUMNS, entity_exists, map_sqlx_error, row_exists, task_from_row,
    task_log_from_row, touch,
};
use crate::db::utils::{current_timestamp, encode_list};
use crate::db::validation::{require_id, require_text, validate_new_task, validate_priority};
use crate::db::{
    DbError, DbResult, Id, NewProjectTask, NewTask, Task, TaskLog, TaskLogKind, TaskQuery,
    TaskRepository, TaskStatus, TaskUpdate,
};

/// SQLx-backed task repository.
pub struct SqliteTaskRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

/// Insert an already validated task. Shared with project creation so both
/// paths write identical rows.
pub(crate) async fn insert_task(
    conn: &mut SqliteConnection,
    project_id: Id,
    stage_id: Id,
    task: &NewProjectTask,
    now: &str,
) -> DbResult<Id> {
    let result = sqlx::query(
        "INSERT INTO tasks (project_id, stage_id, title, description, required_skills, \
         priority, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, 'pending', ?, ?)",
    )
    .bind(project_id)
    .bind(stage_id)
    .bind(&task.title)
    .bind(&task.description)
    .bind(encode_list(&task.required_skills))
    .bind(task.priority)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;

    let id = result.last_insert_rowid();
    insert_log(
        conn,
        id,
        TaskLogKind::Created,
        &format!("created in stage {}", stage_id),
        now,
    )
    .await?;
    Ok(id)
}

async fn insert_log(
    conn: &mut SqliteConnection,
    task_id: Id,
    kind: TaskLogKind,
    message: &str,
    now: &str,
) -> DbResult<()> {
    sqlx::query("INSERT INTO task_logs (task_id, kind, message, created_at) VALUES (?, ?, ?, ?)")
        .bind(task_id)
        .bind(kind.to_string())
        .bind(message)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    Ok(())
}

pub(crate) async fn fetch_task(conn: &mut SqliteConnection, id: Id) -> DbResult<Task> {
    let row = sqlx::query(&format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| DbError::not_found("Task", id))?;

    task_from_row(&row)
}

impl<'a> TaskRepository for SqliteTaskRepository<'a> {
    async fn create(&self, task: &NewTask) -> DbResult<Task> {
        let project_id = require_id("project_id", task.project_id)?;
        let fields = validate_new_task(&NewProjectTask {
            title: task.title.clone(),
            description: task.description.clone(),
            required_skills: task.required_skills.clone(),
            priority: task.priority,
        })?;
        let now = current_timestamp();

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        if !touch(&mut tx, "projects", project_id, &now).await? {
            return Err(DbError::not_found("Project", project_id));
        }

        let stage_id: Option<Id> = sqlx::query_scalar(
            "SELECT id FROM stages WHERE project_id = ? ORDER BY position LIMIT 1",
        )
        .bind(project_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
        let stage_id = stage_id.ok_or_else(|| {
            DbError::validation(format!("project {} has no stages", project_id))
        })?;

        let id = insert_task(&mut tx, project_id, stage_id, &fields, &now).await?;
        let created = fetch_task(&mut tx, id).await?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(created)
    }

    async fn get(&self, id: Id) -> DbResult<Task> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        fetch_task(&mut conn, id).await
    }

    async fn list(&self, query: &TaskQuery) -> DbResult<Vec<Task>> {
        let mut builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new(format!(
            "SELECT {} FROM tasks WHERE 1 = 1",
            TASK_COLUMNS
        ));
        if let Some(project_id) = query.project_id {
            builder.push(" AND project_id = ").push_bind(project_id);
        }
        if let Some(stage_id) = query.stage_id {
            builder.push(" AND stage_id = ").push_bind(stage_id);
        }
        if let Some(status) = query.status {
            builder.push(" AND status = ").push_bind(status.to_string());
        }
        builder.push(" ORDER BY id");

        let rows = builder
            .build()
            .fetch_all(self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(task_from_row).collect()
    }

    async fn available(&self) -> DbResult<Vec<Task>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM tasks WHERE status IN ('pending', 'in_progress') \
             ORDER BY priority DESC, id",
            TASK_COLUMNS
        ))
        .fetch_all(self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(task_from_row).collect()
    }

    async fn logs(&self, task_id: Id) -> DbResult<Vec<TaskLog>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM task_logs WHERE task_id = ? ORDER BY id DESC",
            TASK_LOG_COLUMNS
        ))
        .bind(task_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if rows.is_empty() && !row_exists(&mut tx, "tasks", task_id).await? {
            return Err(DbError::not_found("Task", task_id));
        }
        tx.commit().await.map_err(map_sqlx_error)?;

        rows.iter().map(task_log_from_row).collect()
    }

    async fn update(&self, id: Id, update: &TaskUpdate) -> DbResult<Task> {
        let title = update
            .title
            .as_deref()
            .map(|t| require_text("title", t))
            .transpose()?;
        let priority = update.priority.map(validate_priority).transpose()?;
        let now = current_timestamp();

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        if !touch(&mut tx, "tasks", id, &now).await? {
            return Err(DbError::not_found("Task", id));
        }
        let current = fetch_task(&mut tx, id).await?;

        let stage_id = match update.stage_id {
            Some(stage_id) if stage_id != current.stage_id => {
                let owner: Option<Id> =
                    sqlx::query_scalar("SELECT project_id FROM stages WHERE id = ?")
                        .bind(stage_id)
                        .fetch_optional(&mut *tx)
                        .await
                        .map_err(map_sqlx_error)?;
                match owner {
                    None => return Err(DbError::not_found("Stage", stage_id)),
                    Some(project_id) if project_id != current.project_id => {
                        return Err(DbError::validation(format!(
                            "stage {} does not belong to project {}",
                            stage_id, current.project_id
                        )));
                    }
                    Some(_) => stage_id,
                }
            }
            _ => current.stage_id,
        };

        let assignee_id = match update.assignee_id {
            Some(Some(assignee_id)) => {
                if !entity_exists(&mut tx, assignee_id).await? {
                    return Err(DbError::not_found("Entity", assignee_id));
                }
                Some(assignee_id)
            }
            Some(None) => None,
            None => current.assignee_id,
        };

        let status = update.status.unwrap_or(current.status);
        let completed_at = match (status, current.completed_at.clone()) {
            (TaskStatus::Completed, None) => Some(now.clone()),
            (TaskStatus::Completed, existing) => existing,
            _ => None,
        };
        let required_skills = update
            .required_skills
            .as_ref()
            .map(|skills| {
                skills
                    .iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or(current.required_skills);

        sqlx::query(
            "UPDATE tasks SET title = ?, description = ?, required_skills = ?, priority = ?, \
             status = ?, stage_id = ?, assignee_id = ?, completed_at = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(title.unwrap_or(current.title))
        .bind(
            update
                .description
                .as_deref()
                .map(|d| d.trim().to_string())
                .unwrap_or(current.description),
        )
        .bind(encode_list(&required_skills))
        .bind(priority.unwrap_or(current.priority))
        .bind(status.to_string())
        .bind(stage_id)
        .bind(assignee_id)
        .bind(completed_at)
        .bind(&now)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if status != current.status {
            let message = format!("status {} -> {}", current.status, status);
            insert_log(&mut tx, id, TaskLogKind::Status, &message, &now).await?;
        }
        if stage_id != current.stage_id {
            let message = format!("moved from stage {} to stage {}", current.stage_id, stage_id);
            insert_log(&mut tx, id, TaskLogKind::Stage, &message, &now).await?;
        }
        if assignee_id != current.assignee_id {
            let message = match assignee_id {
                Some(entity_id) => format!("assigned to entity {}", entity_id),
                None => "unassigned".to_string(),
            };
            insert_log(&mut tx, id, TaskLogKind::Assignment, &message, &now).await?;
        }

        let updated = fetch_task(&mut tx, id).await?;
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(updated)
    }

    async fn delete(&self, id: Id) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Task", id));
        }
        Ok(())
    }
}
