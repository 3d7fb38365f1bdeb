//! 仓储操作的错误处理辅助
//!
//! 为每类实体提供操作上下文（操作类型、实体标识、时间戳），
//! 把 sqlx 错误转换为带上下文的 `ManagerError` 并统一记录日志。
//! 唯一约束冲突映射为 `Conflict`，其余数据库错误映射为 `DatabaseOperation`。

use chrono::{DateTime, Utc};
use client_manager_core::ManagerError;
use sqlx::Error as SqlxError;
use std::fmt;
use tracing::{error, info, instrument, warn};

/// 仓储操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryOperation {
    Create,
    BatchCreate,
    Read,
    Query,
    Update,
    Delete,
    Cleanup,
    Migrate,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryOperation::Create => write!(f, "创建"),
            RepositoryOperation::BatchCreate => write!(f, "批量创建"),
            RepositoryOperation::Read => write!(f, "查询"),
            RepositoryOperation::Query => write!(f, "检索"),
            RepositoryOperation::Update => write!(f, "更新"),
            RepositoryOperation::Delete => write!(f, "删除"),
            RepositoryOperation::Cleanup => write!(f, "清理"),
            RepositoryOperation::Migrate => write!(f, "迁移"),
        }
    }
}

/// 仓储操作上下文的公共视图
pub trait OperationContext {
    fn operation(&self) -> RepositoryOperation;
    fn timestamp(&self) -> DateTime<Utc>;
    fn entity_description(&self) -> String;
}

/// 配置项操作上下文
#[derive(Debug, Clone)]
pub struct ConfigurationOperationContext {
    pub operation: RepositoryOperation,
    pub id: Option<i64>,
    pub namespace: Option<String>,
    pub key: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ConfigurationOperationContext {
    pub fn new(operation: RepositoryOperation) -> Self {
        Self {
            operation,
            id: None,
            namespace: None,
            key: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_key(mut self, namespace: &str, key: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self.key = Some(key.to_string());
        self
    }
}

impl OperationContext for ConfigurationOperationContext {
    fn operation(&self) -> RepositoryOperation {
        self.operation
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn entity_description(&self) -> String {
        let composite = match (&self.namespace, &self.key) {
            (Some(ns), Some(key)) => Some(format!("{}/{}", ns, key)),
            _ => None,
        };
        match (self.id, composite) {
            (Some(id), Some(name)) if id > 0 => format!("配置项 '{}' (ID: {})", name, id),
            (_, Some(name)) => format!("配置项 '{}'", name),
            (Some(id), None) => format!("配置项 (ID: {})", id),
            (None, None) => "配置项".to_string(),
        }
    }
}

/// 反馈操作上下文
#[derive(Debug, Clone)]
pub struct FeedbackOperationContext {
    pub operation: RepositoryOperation,
    pub feedback_type: Option<String>,
    pub conversation_id: Option<String>,
    pub batch_size: Option<usize>,
    pub timestamp: DateTime<Utc>,
}

impl FeedbackOperationContext {
    pub fn new(operation: RepositoryOperation) -> Self {
        Self {
            operation,
            feedback_type: None,
            conversation_id: None,
            batch_size: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_type(mut self, feedback_type: &str) -> Self {
        self.feedback_type = Some(feedback_type.to_string());
        self
    }

    pub fn with_conversation(mut self, conversation_id: &str) -> Self {
        self.conversation_id = Some(conversation_id.to_string());
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }
}

impl OperationContext for FeedbackOperationContext {
    fn operation(&self) -> RepositoryOperation {
        self.operation
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn entity_description(&self) -> String {
        let mut desc = match &self.feedback_type {
            Some(t) => format!("{} 类型反馈", t),
            None => "反馈".to_string(),
        };
        if let Some(conversation_id) = &self.conversation_id {
            desc.push_str(&format!(" (会话: {})", conversation_id));
        }
        if let Some(size) = self.batch_size {
            desc.push_str(&format!(" ({} 条)", size));
        }
        desc
    }
}

/// 客户端日志操作上下文
#[derive(Debug, Clone)]
pub struct ClientLogOperationContext {
    pub operation: RepositoryOperation,
    pub client_id: Option<String>,
    pub module_name: Option<String>,
    pub additional_info: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ClientLogOperationContext {
    pub fn new(operation: RepositoryOperation) -> Self {
        Self {
            operation,
            client_id: None,
            module_name: None,
            additional_info: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_client(mut self, client_id: &str) -> Self {
        self.client_id = Some(client_id.to_string());
        self
    }

    pub fn with_module(mut self, module_name: &str) -> Self {
        self.module_name = Some(module_name.to_string());
        self
    }

    pub fn with_additional_info(mut self, info: String) -> Self {
        self.additional_info = Some(info);
        self
    }
}

impl OperationContext for ClientLogOperationContext {
    fn operation(&self) -> RepositoryOperation {
        self.operation
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn entity_description(&self) -> String {
        let base = match (&self.client_id, &self.module_name) {
            (Some(client), Some(module)) => format!("客户端 '{}' 模块 '{}' 的日志", client, module),
            (Some(client), None) => format!("客户端 '{}' 的日志", client),
            (None, Some(module)) => format!("模块 '{}' 的日志", module),
            (None, None) => "客户端日志".to_string(),
        };
        match &self.additional_info {
            Some(info) => format!("{} ({})", base, info),
            None => base,
        }
    }
}

/// 仓储错误辅助
pub struct RepositoryErrorHelpers;

impl RepositoryErrorHelpers {
    /// 带上下文的数据库错误
    ///
    /// 唯一约束冲突返回 `Conflict`，调用方据此向上报告重复创建。
    #[instrument(skip_all, fields(
        operation = %context.operation(),
        timestamp = %context.timestamp(),
    ))]
    pub fn database_error<C: OperationContext>(context: &C, error: SqlxError) -> ManagerError {
        let entity_desc = context.entity_description();
        let operation_desc = context.operation().to_string();

        let error_msg = match &error {
            SqlxError::Database(db_error) => {
                if db_error.is_unique_violation() {
                    warn!(
                        error = %error,
                        constraint = ?db_error.constraint(),
                        "{}{}时发生唯一约束冲突",
                        operation_desc,
                        entity_desc
                    );
                    return ManagerError::Conflict("configuration already exists".to_string());
                }
                match db_error.constraint() {
                    Some(constraint) => {
                        format!("{}{}时发生数据库约束冲突: {}", operation_desc, entity_desc, constraint)
                    }
                    None => format!("{}{}时发生数据库错误: {}", operation_desc, entity_desc, db_error),
                }
            }
            SqlxError::PoolClosed => format!("{}{}时数据库连接池已关闭", operation_desc, entity_desc),
            SqlxError::PoolTimedOut => format!("{}{}时数据库连接池超时", operation_desc, entity_desc),
            SqlxError::Io(io_error) => format!("{}{}时发生I/O错误: {}", operation_desc, entity_desc, io_error),
            _ => format!("{}{}时发生未知数据库错误: {}", operation_desc, entity_desc, error),
        };

        error!(error = %error, "{}", error_msg);
        ManagerError::database_error(error_msg)
    }

    /// 按ID操作时目标不存在
    pub fn configuration_not_found(context: &ConfigurationOperationContext, id: i64) -> ManagerError {
        warn!(
            "{}{}时未找到: 记录不存在或已删除",
            context.operation,
            context.entity_description()
        );
        ManagerError::ConfigurationIdNotFound { id }
    }

    /// 记录仓储操作成功
    pub fn log_operation_success<C: OperationContext>(context: &C, additional_info: Option<&str>) {
        let base_msg = format!("{}{}成功", context.operation(), context.entity_description());

        if let Some(info) = additional_info {
            info!("{}: {}", base_msg, info);
        } else {
            info!("{}", base_msg);
        }
    }
}

/// 快速构造配置项操作上下文
#[macro_export]
macro_rules! config_context {
    ($operation:expr) => {
        $crate::error_handling::ConfigurationOperationContext::new($operation)
    };
    ($operation:expr, id = $id:expr) => {
        $crate::error_handling::ConfigurationOperationContext::new($operation).with_id($id)
    };
    ($operation:expr, namespace = $ns:expr, key = $key:expr) => {
        $crate::error_handling::ConfigurationOperationContext::new($operation).with_key($ns, $key)
    };
    ($operation:expr, id = $id:expr, namespace = $ns:expr, key = $key:expr) => {
        $crate::error_handling::ConfigurationOperationContext::new($operation)
            .with_id($id)
            .with_key($ns, $key)
    };
}

/// 快速构造反馈操作上下文
#[macro_export]
macro_rules! feedback_context {
    ($operation:expr) => {
        $crate::error_handling::FeedbackOperationContext::new($operation)
    };
    ($operation:expr, feedback_type = $t:expr) => {
        $crate::error_handling::FeedbackOperationContext::new($operation).with_type($t)
    };
    ($operation:expr, conversation = $c:expr) => {
        $crate::error_handling::FeedbackOperationContext::new($operation).with_conversation($c)
    };
}

/// 快速构造客户端日志操作上下文
#[macro_export]
macro_rules! log_context {
    ($operation:expr) => {
        $crate::error_handling::ClientLogOperationContext::new($operation)
    };
    ($operation:expr, client = $client:expr, module = $module:expr) => {
        $crate::error_handling::ClientLogOperationContext::new($operation)
            .with_client($client)
            .with_module($module)
    };
}
