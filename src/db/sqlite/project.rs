//! SQLite ProjectRepository implementation.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use super::helpers::{
    PROJECT_COLUMNS, STAGE_COLUMNS, TASK_COLUMNS, entity_exists, map_sqlx_error,
    project_from_row, stage_from_row, task_from_row, touch,
};
use super::task::insert_task;
use crate::db::utils::current_timestamp;
use crate::db::validation::{DEFAULT_STAGES, require_id, require_text, validate_new_task};
use crate::db::{
    CreatedProject, DbError, DbResult, Id, NewProject, Project, ProjectDetails,
    ProjectRepository, ProjectStatus, ProjectUpdate, StageDetails,
};

/// SQLx-backed project repository.
pub struct SqliteProjectRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

async fn fetch_project(conn: &mut SqliteConnection, id: Id) -> DbResult<Project> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM projects WHERE id = ?",
        PROJECT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_sqlx_error)?
    .ok_or_else(|| DbError::not_found("Project", id))?;

    project_from_row(&row)
}

impl<'a> ProjectRepository for SqliteProjectRepository<'a> {
    async fn create(&self, project: &NewProject) -> DbResult<CreatedProject> {
        let name = require_text("name", &project.name)?;
        let owner_id = require_id("owner_id", project.owner_id)?;
        let tasks = project
            .tasks
            .iter()
            .map(validate_new_task)
            .collect::<DbResult<Vec<_>>>()?;
        let now = current_timestamp();

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // The owner check and the insert are one statement, so the write
        // lock is taken before anything is read.
        let result = sqlx::query(
            "INSERT INTO projects (name, description, status, owner_id, created_at, updated_at) \
             SELECT ?, ?, 'pending', id, ?, ? FROM entities WHERE id = ? AND is_active = 1",
        )
        .bind(&name)
        .bind(project.description.trim())
        .bind(&now)
        .bind(&now)
        .bind(owner_id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Entity", owner_id));
        }
        let project_id = result.last_insert_rowid();

        let mut stage_ids = Vec::with_capacity(DEFAULT_STAGES.len());
        for (position, (stage_name, stage_description)) in DEFAULT_STAGES.iter().enumerate() {
            let stage = sqlx::query(
                "INSERT INTO stages (project_id, name, description, position, created_at) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(project_id)
            .bind(*stage_name)
            .bind(*stage_description)
            .bind(position as i64)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
            stage_ids.push(stage.last_insert_rowid());
        }

        // New work always lands in the first stage.
        let mut task_ids = Vec::with_capacity(tasks.len());
        for task in &tasks {
            task_ids.push(insert_task(&mut tx, project_id, stage_ids[0], task, &now).await?);
        }

        let created = fetch_project(&mut tx, project_id).await?;
        tx.commit().await.map_err(map_sqlx_error)?;

        debug!(
            project_id,
            stages = stage_ids.len(),
            tasks = task_ids.len(),
            "created project"
        );
        Ok(CreatedProject {
            project: created,
            stage_ids,
            task_ids,
        })
    }

    async fn get(&self, id: Id) -> DbResult<Project> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        fetch_project(&mut conn, id).await
    }

    async fn details(&self, id: Id) -> DbResult<ProjectDetails> {
        // One read transaction keeps project, stages, and tasks on the same snapshot.
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let project = fetch_project(&mut tx, id).await?;

        let stage_rows = sqlx::query(&format!(
            "SELECT {} FROM stages WHERE project_id = ? ORDER BY position",
            STAGE_COLUMNS
        ))
        .bind(id)
        .fetch_all(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let task_rows = sqlx::query(&format!(
            "SELECT {} FROM tasks WHERE project_id = ? ORDER BY id",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_all(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        let mut tasks = task_rows
            .iter()
            .map(task_from_row)
            .collect::<DbResult<Vec<_>>>()?;

        let mut stages = Vec::with_capacity(stage_rows.len());
        for row in &stage_rows {
            let stage = stage_from_row(row)?;
            let (mine, rest): (Vec<_>, Vec<_>) =
                tasks.into_iter().partition(|t| t.stage_id == stage.id);
            tasks = rest;
            stages.push(StageDetails { stage, tasks: mine });
        }

        Ok(ProjectDetails { project, stages })
    }

    async fn list(&self, status: Option<ProjectStatus>) -> DbResult<Vec<Project>> {
        let mut builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new(format!(
            "SELECT {} FROM projects",
            PROJECT_COLUMNS
        ));
        if let Some(status) = status {
            builder.push(" WHERE status = ").push_bind(status.to_string());
        }
        builder.push(" ORDER BY id");

        let rows = builder
            .build()
            .fetch_all(self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(project_from_row).collect()
    }

    async fn review(&self, id: Id, reviewer_id: Id, decision: ProjectStatus) -> DbResult<Project> {
        if decision == ProjectStatus::Pending {
            return Err(DbError::validation(
                "review decision must be approved or rejected",
            ));
        }
        let now = current_timestamp();

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        if !touch(&mut tx, "projects", id, &now).await? {
            return Err(DbError::not_found("Project", id));
        }

        // The lock is held from here on, so this status cannot change under us.
        let status: String = sqlx::query_scalar("SELECT status FROM projects WHERE id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        if status != ProjectStatus::Pending.to_string() {
            return Err(DbError::InvalidState {
                message: format!("project {} is already {}", id, status),
            });
        }

        if !entity_exists(&mut tx, reviewer_id).await? {
            return Err(DbError::not_found("Entity", reviewer_id));
        }

        let result = sqlx::query(
            "UPDATE projects SET status = ?, reviewer_id = ?, updated_at = ? \
             WHERE id = ? AND status = 'pending'",
        )
        .bind(decision.to_string())
        .bind(reviewer_id)
        .bind(&now)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(DbError::InvalidState {
                message: format!("project {} is no longer pending", id),
            });
        }

        let reviewed = fetch_project(&mut tx, id).await?;
        tx.commit().await.map_err(map_sqlx_error)?;

        debug!(project_id = id, reviewer_id, status = %decision, "reviewed project");
        Ok(reviewed)
    }

    async fn update(&self, id: Id, update: &ProjectUpdate) -> DbResult<Project> {
        let name = update
            .name
            .as_deref()
            .map(|n| require_text("name", n))
            .transpose()?;
        let description = update.description.as_deref().map(str::trim);
        let now = current_timestamp();

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        if !touch(&mut tx, "projects", id, &now).await? {
            return Err(DbError::not_found("Project", id));
        }

        sqlx::query(
            "UPDATE projects SET name = COALESCE(?, name), description = COALESCE(?, description) \
             WHERE id = ?",
        )
        .bind(name)
        .bind(description)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let updated = fetch_project(&mut tx, id).await?;
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(updated)
    }

    async fn delete(&self, id: Id) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Project", id));
        }
        Ok(())
    }
}
