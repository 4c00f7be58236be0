//! SQLite EntityRepository implementation.

use sqlx::SqlitePool;

use super::helpers::{ENTITY_COLUMNS, entity_from_row, map_sqlx_error};
use crate::db::utils::{current_timestamp, encode_list, generate_api_key};
use crate::db::validation::require_text;
use crate::db::{DbError, DbResult, Entity, EntityKind, EntityRepository, Id, NewEntity};

/// SQLx-backed entity repository.
pub struct SqliteEntityRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl<'a> EntityRepository for SqliteEntityRepository<'a> {
    async fn register(&self, entity: &NewEntity) -> DbResult<Entity> {
        let name = require_text("name", &entity.name)?;
        let skills: Vec<String> = entity
            .skills
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let api_key = generate_api_key();
        let created_at = current_timestamp();

        let result = sqlx::query(
            "INSERT INTO entities (name, kind, skills, api_key, is_active, created_at) \
             VALUES (?, ?, ?, ?, 1, ?)",
        )
        .bind(&name)
        .bind(entity.kind.to_string())
        .bind(encode_list(&skills))
        .bind(&api_key)
        .bind(&created_at)
        .execute(self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(Entity {
            id: result.last_insert_rowid(),
            name,
            kind: entity.kind,
            skills,
            api_key,
            is_active: true,
            created_at,
        })
    }

    async fn get(&self, id: Id) -> DbResult<Entity> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM entities WHERE id = ?",
            ENTITY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(map_sqlx_error)?
        .ok_or_else(|| DbError::not_found("Entity", id))?;

        entity_from_row(&row)
    }

    async fn get_by_api_key(&self, api_key: &str) -> DbResult<Option<Entity>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM entities WHERE api_key = ? AND is_active = 1",
            ENTITY_COLUMNS
        ))
        .bind(api_key)
        .fetch_optional(self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(entity_from_row).transpose()
    }

    async fn list(&self, kind: Option<EntityKind>) -> DbResult<Vec<Entity>> {
        let mut builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new(format!(
            "SELECT {} FROM entities WHERE is_active = 1",
            ENTITY_COLUMNS
        ));
        if let Some(kind) = kind {
            builder.push(" AND kind = ").push_bind(kind.to_string());
        }
        builder.push(" ORDER BY id");

        let rows = builder
            .build()
            .fetch_all(self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(entity_from_row).collect()
    }
}
