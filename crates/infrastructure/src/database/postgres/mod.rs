pub mod postgres_client_log_repository;
pub mod postgres_configuration_repository;
pub mod postgres_feedback_repository;

pub use postgres_client_log_repository::PostgresClientLogRepository;
pub use postgres_configuration_repository::PostgresConfigurationRepository;
pub use postgres_feedback_repository::PostgresFeedbackRepository;

use client_manager_core::ManagerResult;
use sqlx::PgPool;
use tracing::debug;

use crate::error_handling::{RepositoryErrorHelpers, RepositoryOperation};

/// 运行PostgreSQL数据库迁移，可重复执行
pub async fn run_migrations(pool: &PgPool) -> ManagerResult<()> {
    debug!("Running PostgreSQL database migrations");
    let context = crate::config_context!(RepositoryOperation::Migrate);

    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS configurations (
            id BIGSERIAL PRIMARY KEY,
            namespace VARCHAR(255) NOT NULL,
            key VARCHAR(255) NOT NULL,
            value TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            deleted_at TIMESTAMPTZ
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS feedbacks (
            id BIGSERIAL PRIMARY KEY,
            type VARCHAR(50) NOT NULL,
            conversation_id VARCHAR(255) NOT NULL DEFAULT '',
            user_id VARCHAR(255) NOT NULL DEFAULT '',
            content TEXT NOT NULL DEFAULT '',
            metadata TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS logs (
            id BIGSERIAL PRIMARY KEY,
            client_id VARCHAR(255) NOT NULL,
            user_id VARCHAR(255) NOT NULL DEFAULT '',
            module_name VARCHAR(255) NOT NULL,
            file_name VARCHAR(1024) NOT NULL DEFAULT '',
            log_content TEXT NOT NULL DEFAULT '',
            first_line_no BIGINT NOT NULL DEFAULT 0,
            end_line_no BIGINT NOT NULL DEFAULT 0,
            start_flag BOOLEAN NOT NULL DEFAULT FALSE,
            end_flag BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_configurations_namespace_key ON configurations(namespace, key) WHERE deleted_at IS NULL",
        "CREATE INDEX IF NOT EXISTS idx_configurations_created_at ON configurations(created_at)",
        "CREATE INDEX IF NOT EXISTS idx_feedbacks_conversation_id ON feedbacks(conversation_id)",
        "CREATE INDEX IF NOT EXISTS idx_feedbacks_type ON feedbacks(type)",
        "CREATE INDEX IF NOT EXISTS idx_feedbacks_created_at ON feedbacks(created_at)",
        "CREATE INDEX IF NOT EXISTS idx_logs_client_id ON logs(client_id)",
        "CREATE INDEX IF NOT EXISTS idx_logs_user_id ON logs(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_logs_module_name ON logs(module_name)",
        "CREATE INDEX IF NOT EXISTS idx_logs_created_at ON logs(created_at)",
    ];

    for sql in statements {
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(&context, e))?;
    }

    debug!("Successfully completed PostgreSQL database migrations");
    Ok(())
}
