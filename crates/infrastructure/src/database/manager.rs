use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use client_manager_core::{
    ClientLogRepository, ConfigurationRepository, DatabaseConfig, FeedbackRepository, ManagerError, ManagerResult,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{debug, info};

use super::postgres::{self, PostgresClientLogRepository, PostgresConfigurationRepository, PostgresFeedbackRepository};
use super::sqlite::{self, SqliteClientLogRepository, SqliteConfigurationRepository, SqliteFeedbackRepository};

/// 按URL判断数据库类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    PostgreSQL,
    SQLite,
}

impl DatabaseType {
    pub fn from_url(url: &str) -> Self {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            DatabaseType::PostgreSQL
        } else {
            DatabaseType::SQLite
        }
    }
}

/// 数据库连接池
#[derive(Clone)]
pub enum DatabasePool {
    PostgreSQL(sqlx::PgPool),
    SQLite(sqlx::SqlitePool),
}

impl DatabasePool {
    /// 根据配置创建连接池，类型由URL自动识别
    pub async fn new(config: &DatabaseConfig) -> ManagerResult<Self> {
        let acquire_timeout = Duration::from_secs(config.connection_timeout_seconds);

        match DatabaseType::from_url(&config.url) {
            DatabaseType::PostgreSQL => {
                let pool = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .min_connections(config.min_connections)
                    .acquire_timeout(acquire_timeout)
                    .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
                    .max_lifetime(Duration::from_secs(1800)) // 30分钟默认生命周期
                    .connect(&config.url)
                    .await?;
                Ok(DatabasePool::PostgreSQL(pool))
            }
            DatabaseType::SQLite => {
                let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

                // 内存库随最后一个连接关闭而消失，固定为单个常驻连接
                let pool_options = if config.is_in_memory() {
                    SqlitePoolOptions::new()
                        .max_connections(1)
                        .min_connections(1)
                        .idle_timeout(None)
                        .max_lifetime(None)
                } else {
                    SqlitePoolOptions::new()
                        .max_connections(config.max_connections)
                        .min_connections(config.min_connections)
                        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
                        .max_lifetime(Duration::from_secs(1800))
                };

                let pool = pool_options
                    .acquire_timeout(acquire_timeout)
                    .connect_with(options)
                    .await?;
                Ok(DatabasePool::SQLite(pool))
            }
        }
    }

    pub fn database_type(&self) -> DatabaseType {
        match self {
            DatabasePool::PostgreSQL(_) => DatabaseType::PostgreSQL,
            DatabasePool::SQLite(_) => DatabaseType::SQLite,
        }
    }

    pub async fn health_check(&self) -> ManagerResult<()> {
        match self {
            DatabasePool::PostgreSQL(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
            DatabasePool::SQLite(pool) => {
                sqlx::query("SELECT 1").execute(pool).await?;
            }
        }
        Ok(())
    }

    pub async fn close(&self) {
        match self {
            DatabasePool::PostgreSQL(pool) => pool.close().await,
            DatabasePool::SQLite(pool) => pool.close().await,
        }
    }
}

/// 数据库管理器
///
/// 持有连接池，负责迁移、健康检查，并按数据库类型构造仓储实现。
pub struct DatabaseManager {
    pool: DatabasePool,
}

impl DatabaseManager {
    pub async fn new(config: &DatabaseConfig) -> ManagerResult<Self> {
        let pool = DatabasePool::new(config).await?;
        info!("数据库连接池创建成功: {:?}", pool.database_type());
        Ok(Self { pool })
    }

    pub fn database_type(&self) -> DatabaseType {
        self.pool.database_type()
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// 运行数据库迁移
    pub async fn migrate(&self) -> ManagerResult<()> {
        match &self.pool {
            DatabasePool::PostgreSQL(pool) => postgres::run_migrations(pool).await?,
            DatabasePool::SQLite(pool) => sqlite::run_migrations(pool).await?,
        }
        debug!("数据库迁移完成");
        Ok(())
    }

    /// 检查数据库连接健康状态
    pub async fn health_check(&self) -> ManagerResult<()> {
        self.pool
            .health_check()
            .await
            .map_err(|e| ManagerError::database_error(format!("数据库健康检查失败: {}", e)))
    }

    /// 关闭数据库连接池
    pub async fn close(&self) {
        self.pool.close().await
    }

    pub fn configuration_repository(&self) -> Arc<dyn ConfigurationRepository> {
        match &self.pool {
            DatabasePool::PostgreSQL(pool) => Arc::new(PostgresConfigurationRepository::new(pool.clone())),
            DatabasePool::SQLite(pool) => Arc::new(SqliteConfigurationRepository::new(pool.clone())),
        }
    }

    pub fn feedback_repository(&self) -> Arc<dyn FeedbackRepository> {
        match &self.pool {
            DatabasePool::PostgreSQL(pool) => Arc::new(PostgresFeedbackRepository::new(pool.clone())),
            DatabasePool::SQLite(pool) => Arc::new(SqliteFeedbackRepository::new(pool.clone())),
        }
    }

    pub fn client_log_repository(&self) -> Arc<dyn ClientLogRepository> {
        match &self.pool {
            DatabasePool::PostgreSQL(pool) => Arc::new(PostgresClientLogRepository::new(pool.clone())),
            DatabasePool::SQLite(pool) => Arc::new(SqliteClientLogRepository::new(pool.clone())),
        }
    }
}
