//! 数据仓储层接口定义
//!
//! 此模块定义了数据持久化层的核心抽象接口：
//! - 配置项仓储接口 (ConfigurationRepository)
//! - 反馈仓储接口 (FeedbackRepository)
//! - 客户端日志仓储接口 (ClientLogRepository)
//!
//! ## 设计原则
//!
//! ### 接口隔离
//! 每个仓储接口只负责一种实体。配置项仓储还有一个带缓存的装饰实现
//! （基础设施层的 `CachedConfigurationRepository`），与数据库实现实现同一接口，
//! 服务层无需感知缓存是否存在。
//!
//! ### 未找到的表达
//! 点查询返回 `Option`，`None` 表示不存在（含已软删除）。
//! 按 ID 的更新和删除在目标不存在时返回 `ConfigurationIdNotFound`。
//!
//! ### 后端
//! - PostgreSQL 实现
//! - SQLite 实现
//! - 内存实现（测试用，见 testing-utils）

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::ManagerResult;
use crate::models::{
    ClientLog, ConfigurationEntry, ConfigurationFilter, Feedback, FeedbackStats, FeedbackType,
    LogScope, LogStats, PageRequest,
};

/// 配置项仓储接口
///
/// 所有读取都排除软删除的记录。
///
/// # 示例
///
/// ```rust,ignore
/// async fn bump_timeout(repo: &dyn ConfigurationRepository) -> ManagerResult<()> {
///     if let Some(mut entry) = repo.get_by_key("build", "timeout").await? {
///         entry.value = "60".to_string();
///         repo.update(&entry).await?;
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ConfigurationRepository: Send + Sync {
    /// 根据复合键 `(namespace, key)` 获取配置项
    async fn get_by_key(&self, namespace: &str, key: &str) -> ManagerResult<Option<ConfigurationEntry>>;

    /// 持久化存储中是否存在存活的 `(namespace, key)` 记录
    ///
    /// 不经过缓存，创建前查重使用。
    async fn exists_by_key(&self, namespace: &str, key: &str) -> ManagerResult<bool>;

    /// 根据ID获取配置项
    async fn get_by_id(&self, id: i64) -> ManagerResult<Option<ConfigurationEntry>>;

    /// 创建配置项
    ///
    /// 返回带有数据库分配ID和时间戳的记录。
    ///
    /// # 错误
    ///
    /// * `Conflict` - 存活记录中已存在相同的 `(namespace, key)`
    /// * `Database` - 数据库操作失败
    async fn create(&self, entry: &ConfigurationEntry) -> ManagerResult<ConfigurationEntry>;

    /// 整条更新配置项（按 `entry.id`）
    ///
    /// # 错误
    ///
    /// * `ConfigurationIdNotFound` - 记录不存在或已删除
    /// * `Conflict` - 修改后的复合键与另一条存活记录冲突
    async fn update(&self, entry: &ConfigurationEntry) -> ManagerResult<ConfigurationEntry>;

    /// 软删除配置项
    ///
    /// # 错误
    ///
    /// * `ConfigurationIdNotFound` - 记录不存在或已删除
    async fn delete(&self, id: i64) -> ManagerResult<()>;

    /// 分页列出配置项，按创建时间倒序
    async fn list(&self, filter: &ConfigurationFilter) -> ManagerResult<Vec<ConfigurationEntry>>;

    /// 统计满足过滤条件的配置项数量（忽略分页字段）
    async fn count(&self, filter: &ConfigurationFilter) -> ManagerResult<i64>;

    /// 列出命名空间下的全部配置项，按 key 升序
    async fn list_by_namespace(&self, namespace: &str) -> ManagerResult<Vec<ConfigurationEntry>>;
}

/// 反馈仓储接口
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn create(&self, feedback: &Feedback) -> ManagerResult<Feedback>;

    /// 在一个事务内批量写入，返回写入条数
    async fn create_batch(&self, feedbacks: &[Feedback]) -> ManagerResult<usize>;

    /// 会话下的全部反馈，按创建时间正序
    async fn list_by_conversation(&self, conversation_id: &str) -> ManagerResult<Vec<Feedback>>;

    async fn list_by_type(&self, feedback_type: FeedbackType, page: PageRequest) -> ManagerResult<Vec<Feedback>>;

    async fn count_by_type(&self, feedback_type: FeedbackType) -> ManagerResult<i64>;

    /// 时间区间内（含两端）按类型计数
    async fn stats(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> ManagerResult<FeedbackStats>;
}

/// 客户端日志仓储接口
#[async_trait]
pub trait ClientLogRepository: Send + Sync {
    async fn create(&self, log: &ClientLog) -> ManagerResult<ClientLog>;

    /// 按维度分页检索，按创建时间倒序
    async fn list(&self, scope: &LogScope, page: PageRequest) -> ManagerResult<Vec<ClientLog>>;

    async fn count(&self, scope: &LogScope) -> ManagerResult<i64>;

    async fn stats(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> ManagerResult<LogStats>;

    /// 物理删除早于给定时间的日志，返回删除条数
    async fn delete_before(&self, before: DateTime<Utc>) -> ManagerResult<u64>;
}
