use async_trait::async_trait;
use chrono::{DateTime, Utc};
use client_manager_core::{ClientLog, ClientLogRepository, LogScope, LogStats, ManagerResult, PageRequest};
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::{debug, instrument};

use crate::{
    error_handling::{RepositoryErrorHelpers, RepositoryOperation},
    log_context,
};

const SELECT_COLUMNS: &str = "id, client_id, user_id, module_name, file_name, log_content, \
    first_line_no, end_line_no, start_flag, end_flag, created_at, updated_at";

pub struct PostgresClientLogRepository {
    pool: PgPool,
}

impl PostgresClientLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_log(row: &PgRow) -> ManagerResult<ClientLog> {
        Ok(ClientLog {
            id: row.try_get("id")?,
            client_id: row.try_get("client_id")?,
            user_id: row.try_get("user_id")?,
            module_name: row.try_get("module_name")?,
            file_name: row.try_get("file_name")?,
            log_content: row.try_get("log_content")?,
            first_line_no: row.try_get("first_line_no")?,
            end_line_no: row.try_get("end_line_no")?,
            start_flag: row.try_get("start_flag")?,
            end_flag: row.try_get("end_flag")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// 检索维度对应的 WHERE 条件，唯一的参数 `$1` 是 `scope.value()`
    fn scope_condition(scope: &LogScope) -> String {
        match scope {
            LogScope::Sessions(_) => "client_id = $1 AND (start_flag OR end_flag)".to_string(),
            _ => format!("{} = $1", scope.field()),
        }
    }

    async fn group_counts(
        &self,
        column: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ManagerResult<Vec<(String, i64)>> {
        let context = log_context!(RepositoryOperation::Query).with_additional_info(format!("按 {} 分组", column));

        let rows = sqlx::query(&format!(
            "SELECT {column} AS name, COUNT(*) AS count FROM logs WHERE created_at BETWEEN $1 AND $2 GROUP BY {column}"
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(&context, e))?;

        rows.iter()
            .map(|row| -> ManagerResult<(String, i64)> { Ok((row.try_get("name")?, row.try_get("count")?)) })
            .collect()
    }
}

#[async_trait]
impl ClientLogRepository for PostgresClientLogRepository {
    #[instrument(skip(self, log), fields(client_id = %log.client_id, module_name = %log.module_name))]
    async fn create(&self, log: &ClientLog) -> ManagerResult<ClientLog> {
        let context = log_context!(RepositoryOperation::Create, client = &log.client_id, module = &log.module_name);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO logs (client_id, user_id, module_name, file_name, log_content,
                              first_line_no, end_line_no, start_flag, end_flag, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(&log.client_id)
        .bind(&log.user_id)
        .bind(&log.module_name)
        .bind(&log.file_name)
        .bind(&log.log_content)
        .bind(log.first_line_no)
        .bind(log.end_line_no)
        .bind(log.start_flag)
        .bind(log.end_flag)
        .bind(log.created_at)
        .bind(log.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(&context, e))?;

        let created = Self::row_to_log(&row)?;
        debug!("写入客户端日志成功: ID {}", created.id);
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn list(&self, scope: &LogScope, page: PageRequest) -> ManagerResult<Vec<ClientLog>> {
        let context = log_context!(RepositoryOperation::Query)
            .with_additional_info(format!("{} = {}", scope.field(), scope.value()));

        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM logs WHERE {} ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
            Self::scope_condition(scope)
        ))
        .bind(scope.value())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(&context, e))?;

        rows.iter().map(Self::row_to_log).collect()
    }

    #[instrument(skip(self))]
    async fn count(&self, scope: &LogScope) -> ManagerResult<i64> {
        let context = log_context!(RepositoryOperation::Query)
            .with_additional_info(format!("{} = {}", scope.field(), scope.value()));

        let row = sqlx::query(&format!(
            "SELECT COUNT(*) AS count FROM logs WHERE {}",
            Self::scope_condition(scope)
        ))
        .bind(scope.value())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(&context, e))?;

        Ok(row.try_get("count")?)
    }

    #[instrument(skip(self))]
    async fn stats(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> ManagerResult<LogStats> {
        let client_counts = self.group_counts("client_id", start, end).await?;
        let module_counts = self.group_counts("module_name", start, end).await?;

        Ok(LogStats {
            total_count: client_counts.iter().map(|(_, count)| count).sum(),
            client_counts: client_counts.into_iter().collect(),
            module_counts: module_counts.into_iter().collect(),
        })
    }

    #[instrument(skip(self))]
    async fn delete_before(&self, before: DateTime<Utc>) -> ManagerResult<u64> {
        let context = log_context!(RepositoryOperation::Cleanup).with_additional_info(format!("早于 {}", before));

        let result = sqlx::query("DELETE FROM logs WHERE created_at < $1")
            .bind(before)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(&context, e))?;

        RepositoryErrorHelpers::log_operation_success(&context, Some(&format!("删除 {} 条", result.rows_affected())));
        Ok(result.rows_affected())
    }
}
