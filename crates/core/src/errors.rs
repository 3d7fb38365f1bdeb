use thiserror::Error;

/// 客户端管理服务错误类型定义
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("数据库操作错误: {0}")]
    DatabaseOperation(String),

    #[error("配置项未找到: {namespace}/{key}")]
    ConfigurationNotFound { namespace: String, key: String },

    #[error("配置项未找到: ID {id}")]
    ConfigurationIdNotFound { id: i64 },

    #[error("参数验证失败 [{field}]: {message}")]
    Validation { field: String, message: String },

    #[error("资源冲突: {0}")]
    Conflict(String),

    #[error("缓存错误: {0}")]
    Cache(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 统一的Result类型
pub type ManagerResult<T> = std::result::Result<T, ManagerError>;

impl From<serde_json::Error> for ManagerError {
    fn from(err: serde_json::Error) -> Self {
        ManagerError::Serialization(err.to_string())
    }
}

impl ManagerError {
    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        ManagerError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn database_error<S: Into<String>>(msg: S) -> Self {
        ManagerError::DatabaseOperation(msg.into())
    }

    pub fn cache_error<S: Into<String>>(msg: S) -> Self {
        ManagerError::Cache(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ManagerError::ConfigurationNotFound { .. } | ManagerError::ConfigurationIdNotFound { .. }
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ManagerError::Validation { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ManagerError::Conflict(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ManagerError::validation("namespace", "namespace不能为空");
        assert_eq!(err.to_string(), "参数验证失败 [namespace]: namespace不能为空");
        assert!(err.is_validation());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_classification() {
        let by_key = ManagerError::ConfigurationNotFound {
            namespace: "build".to_string(),
            key: "timeout".to_string(),
        };
        let by_id = ManagerError::ConfigurationIdNotFound { id: 7 };

        assert!(by_key.is_not_found());
        assert!(by_id.is_not_found());
        assert_eq!(by_key.to_string(), "配置项未找到: build/timeout");
        assert_eq!(by_id.to_string(), "配置项未找到: ID 7");
    }

    #[test]
    fn test_serde_error_conversion() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let converted: ManagerError = err.into();
        assert!(matches!(converted, ManagerError::Serialization(_)));
    }
}
