//! SQLite StageRepository implementation.

use sqlx::{SqliteConnection, SqlitePool};

use super::helpers::{STAGE_COLUMNS, map_sqlx_error, row_exists, stage_from_row, touch};
use crate::db::utils::current_timestamp;
use crate::db::validation::require_text;
use crate::db::{DbError, DbResult, Id, NewStage, Stage, StageRepository, StageUpdate};

/// SQLx-backed stage repository.
pub struct SqliteStageRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

async fn fetch_stage(conn: &mut SqliteConnection, id: Id) -> DbResult<Stage> {
    let row = sqlx::query(&format!("SELECT {} FROM stages WHERE id = ?", STAGE_COLUMNS))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| DbError::not_found("Stage", id))?;

    stage_from_row(&row)
}

impl<'a> StageRepository for SqliteStageRepository<'a> {
    async fn list(&self, project_id: Id) -> DbResult<Vec<Stage>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM stages WHERE project_id = ? ORDER BY position",
            STAGE_COLUMNS
        ))
        .bind(project_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if rows.is_empty() && !row_exists(&mut tx, "projects", project_id).await? {
            return Err(DbError::not_found("Project", project_id));
        }
        tx.commit().await.map_err(map_sqlx_error)?;

        rows.iter().map(stage_from_row).collect()
    }

    async fn create(&self, project_id: Id, stage: &NewStage) -> DbResult<Stage> {
        let name = require_text("name", &stage.name)?;
        let now = current_timestamp();

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        if !touch(&mut tx, "projects", project_id, &now).await? {
            return Err(DbError::not_found("Project", project_id));
        }

        let result = sqlx::query(
            "INSERT INTO stages (project_id, name, description, position, created_at) \
             SELECT ?, ?, ?, COALESCE(MAX(position) + 1, 0), ? FROM stages WHERE project_id = ?",
        )
        .bind(project_id)
        .bind(&name)
        .bind(stage.description.trim())
        .bind(&now)
        .bind(project_id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let created = fetch_stage(&mut tx, result.last_insert_rowid()).await?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(created)
    }

    async fn update(&self, id: Id, update: &StageUpdate) -> DbResult<Stage> {
        let name = update
            .name
            .as_deref()
            .map(|n| require_text("name", n))
            .transpose()?;
        let description = update.description.as_deref().map(str::trim);

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // Stages carry no updated_at; the update itself takes the write lock.
        let result = sqlx::query(
            "UPDATE stages SET name = COALESCE(?, name), description = COALESCE(?, description) \
             WHERE id = ?",
        )
        .bind(name)
        .bind(description)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Stage", id));
        }

        let updated = fetch_stage(&mut tx, id).await?;
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(updated)
    }

    async fn delete(&self, id: Id) -> DbResult<()> {
        let now = current_timestamp();
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let touched = sqlx::query(
            "UPDATE projects SET updated_at = ? \
             WHERE id = (SELECT project_id FROM stages WHERE id = ?)",
        )
        .bind(&now)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
        if touched.rows_affected() == 0 {
            return Err(DbError::not_found("Stage", id));
        }

        let (tasks, siblings): (i64, i64) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM tasks WHERE stage_id = s.id), \
                    (SELECT COUNT(*) FROM stages WHERE project_id = s.project_id) \
             FROM stages s WHERE s.id = ?",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        if tasks > 0 {
            return Err(DbError::InvalidState {
                message: format!("stage {} still holds {} task(s)", id, tasks),
            });
        }
        if siblings <= 1 {
            return Err(DbError::InvalidState {
                message: format!("stage {} is the project's only stage", id),
            });
        }

        sqlx::query("DELETE FROM stages WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }
}
