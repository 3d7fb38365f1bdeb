pub mod sqlite_client_log_repository;
pub mod sqlite_configuration_repository;
pub mod sqlite_feedback_repository;

pub use sqlite_client_log_repository::SqliteClientLogRepository;
pub use sqlite_configuration_repository::SqliteConfigurationRepository;
pub use sqlite_feedback_repository::SqliteFeedbackRepository;

use client_manager_core::ManagerResult;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error_handling::{RepositoryErrorHelpers, RepositoryOperation};

/// 运行SQLite数据库迁移，可重复执行
pub async fn run_migrations(pool: &SqlitePool) -> ManagerResult<()> {
    debug!("Running SQLite database migrations");
    let context = crate::config_context!(RepositoryOperation::Migrate);

    let statements = [
        // 配置项表，deleted_at 非空表示已软删除
        r#"
        CREATE TABLE IF NOT EXISTS configurations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            namespace TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL,
            deleted_at DATETIME
        )
        "#,
        // 反馈表
        r#"
        CREATE TABLE IF NOT EXISTS feedbacks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            type TEXT NOT NULL,
            conversation_id TEXT NOT NULL DEFAULT '',
            user_id TEXT NOT NULL DEFAULT '',
            content TEXT NOT NULL DEFAULT '',
            metadata TEXT NOT NULL DEFAULT '',
            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL
        )
        "#,
        // 客户端日志表
        r#"
        CREATE TABLE IF NOT EXISTS logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            client_id TEXT NOT NULL,
            user_id TEXT NOT NULL DEFAULT '',
            module_name TEXT NOT NULL,
            file_name TEXT NOT NULL DEFAULT '',
            log_content TEXT NOT NULL DEFAULT '',
            first_line_no INTEGER NOT NULL DEFAULT 0,
            end_line_no INTEGER NOT NULL DEFAULT 0,
            start_flag BOOLEAN NOT NULL DEFAULT 0,
            end_flag BOOLEAN NOT NULL DEFAULT 0,
            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL
        )
        "#,
        // 存活记录的复合键唯一
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

    debug!("Successfully completed SQLite database migrations");
    Ok(())
}
