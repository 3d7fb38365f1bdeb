use async_trait::async_trait;
use chrono::Utc;
use client_manager_core::{ConfigurationEntry, ConfigurationFilter, ConfigurationRepository, ManagerResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::{debug, instrument};

use crate::{
    config_context,
    database::like_pattern,
    error_handling::{RepositoryErrorHelpers, RepositoryOperation},
};

const SELECT_COLUMNS: &str = "id, namespace, key, value, description, created_at, updated_at";

pub struct SqliteConfigurationRepository {
    pool: SqlitePool,
}

impl SqliteConfigurationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_entry(row: &SqliteRow) -> ManagerResult<ConfigurationEntry> {
        Ok(ConfigurationEntry {
            id: row.try_get("id")?,
            namespace: row.try_get("namespace")?,
            key: row.try_get("key")?,
            value: row.try_get("value")?,
            description: row.try_get("description")?,
            created_at: Some(row.try_get("created_at")?),
            updated_at: Some(row.try_get("updated_at")?),
        })
    }

    fn search_pattern(filter: &ConfigurationFilter) -> Option<String> {
        filter.search.as_deref().map(like_pattern)
    }
}

#[async_trait]
impl ConfigurationRepository for SqliteConfigurationRepository {
    #[instrument(skip(self))]
    async fn get_by_key(&self, namespace: &str, key: &str) -> ManagerResult<Option<ConfigurationEntry>> {
        let context = config_context!(RepositoryOperation::Read, namespace = namespace, key = key);

        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM configurations WHERE namespace = ? AND key = ? AND deleted_at IS NULL"
        ))
        .bind(namespace)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(&context, e))?;

        match row {
            Some(row) => {
                let entry = Self::row_to_entry(&row)?;
                debug!("查询配置项成功: {}/{} (ID: {})", namespace, key, entry.id);
                Ok(Some(entry))
            }
            None => {
                debug!("查询配置项不存在: {}/{}", namespace, key);
                Ok(None)
            }
        }
    }

    #[instrument(skip(self))]
    async fn exists_by_key(&self, namespace: &str, key: &str) -> ManagerResult<bool> {
        let context = config_context!(RepositoryOperation::Read, namespace = namespace, key = key);

        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM configurations WHERE namespace = ? AND key = ? AND deleted_at IS NULL",
        )
        .bind(namespace)
        .bind(key)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(&context, e))?;

        let count: i64 = row.try_get("count")?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: i64) -> ManagerResult<Option<ConfigurationEntry>> {
        let context = config_context!(RepositoryOperation::Read, id = id);

        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM configurations WHERE id = ? AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(&context, e))?;

        row.as_ref().map(Self::row_to_entry).transpose()
    }

    #[instrument(skip(self, entry), fields(namespace = %entry.namespace, key = %entry.key))]
    async fn create(&self, entry: &ConfigurationEntry) -> ManagerResult<ConfigurationEntry> {
        let context = config_context!(RepositoryOperation::Create, namespace = &entry.namespace, key = &entry.key);
        let now = Utc::now();

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO configurations (namespace, key, value, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(&entry.namespace)
        .bind(&entry.key)
        .bind(&entry.value)
        .bind(&entry.description)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(&context, e))?;

        let created = Self::row_to_entry(&row)?;
        RepositoryErrorHelpers::log_operation_success(&context, Some(&format!("ID: {}", created.id)));
        Ok(created)
    }

    #[instrument(skip(self, entry), fields(id = %entry.id))]
    async fn update(&self, entry: &ConfigurationEntry) -> ManagerResult<ConfigurationEntry> {
        let context = config_context!(
            RepositoryOperation::Update,
            id = entry.id,
            namespace = &entry.namespace,
            key = &entry.key
        );

        let row = sqlx::query(&format!(
            r#"
            UPDATE configurations
            SET namespace = ?, key = ?, value = ?, description = ?, updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(&entry.namespace)
        .bind(&entry.key)
        .bind(&entry.value)
        .bind(&entry.description)
        .bind(Utc::now())
        .bind(entry.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(&context, e))?;

        match row {
            Some(row) => {
                let updated = Self::row_to_entry(&row)?;
                RepositoryErrorHelpers::log_operation_success(&context, None);
                Ok(updated)
            }
            None => Err(RepositoryErrorHelpers::configuration_not_found(&context, entry.id)),
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> ManagerResult<()> {
        let context = config_context!(RepositoryOperation::Delete, id = id);
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE configurations SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(&context, e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryErrorHelpers::configuration_not_found(&context, id));
        }

        RepositoryErrorHelpers::log_operation_success(&context, None);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &ConfigurationFilter) -> ManagerResult<Vec<ConfigurationEntry>> {
        let context = config_context!(RepositoryOperation::Query);
        let pattern = Self::search_pattern(filter);

        let rows = sqlx::query(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM configurations
            WHERE deleted_at IS NULL
              AND (?1 IS NULL OR namespace LIKE ?1 ESCAPE '\' OR key LIKE ?1 ESCAPE '\' OR description LIKE ?1 ESCAPE '\')
            ORDER BY created_at DESC, id DESC
            LIMIT ?2 OFFSET ?3
            "#
        ))
        .bind(pattern)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(&context, e))?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    #[instrument(skip(self))]
    async fn count(&self, filter: &ConfigurationFilter) -> ManagerResult<i64> {
        let context = config_context!(RepositoryOperation::Query);
        let pattern = Self::search_pattern(filter);

        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count FROM configurations
            WHERE deleted_at IS NULL
              AND (?1 IS NULL OR namespace LIKE ?1 ESCAPE '\' OR key LIKE ?1 ESCAPE '\' OR description LIKE ?1 ESCAPE '\')
            "#,
        )
        .bind(pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(&context, e))?;

        Ok(row.try_get("count")?)
    }

    #[instrument(skip(self))]
    async fn list_by_namespace(&self, namespace: &str) -> ManagerResult<Vec<ConfigurationEntry>> {
        let context = config_context!(RepositoryOperation::Query);

        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM configurations WHERE namespace = ? AND deleted_at IS NULL ORDER BY key ASC"
        ))
        .bind(namespace)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(&context, e))?;

        debug!("命名空间 {} 下共 {} 个配置项", namespace, rows.len());
        rows.iter().map(Self::row_to_entry).collect()
    }
}
