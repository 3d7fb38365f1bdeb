use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 配置项
///
/// 由缓存命中合成的配置项只有 `namespace`、`key`、`value`，
/// `id` 为 0，`description` 为空，时间戳缺省（序列化时省略）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationEntry {
    pub id: i64,
    pub namespace: String,
    pub key: String,
    pub value: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ConfigurationEntry {
    /// 创建尚未持久化的配置项
    pub fn new<N, K, V>(namespace: N, key: K, value: V) -> Self
    where
        N: Into<String>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            id: 0,
            namespace: namespace.into(),
            key: key.into(),
            value: value.into(),
            description: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_description<D: Into<String>>(mut self, description: D) -> Self {
        self.description = description.into();
        self
    }

    /// 由缓存值合成配置项
    pub fn from_cached_value(namespace: &str, key: &str, value: String) -> Self {
        Self::new(namespace, key, value)
    }

    /// 是否已落库
    pub fn is_persisted(&self) -> bool {
        self.id > 0
    }

    /// 是否来自缓存（缺少数据库元数据）
    pub fn is_cache_synthesized(&self) -> bool {
        self.id == 0 && self.created_at.is_none()
    }
}

/// 创建配置项请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateConfigurationRequest {
    pub namespace: Option<String>,
    pub key: Option<String>,
    pub value: Option<String>,
    pub description: Option<String>,
}

/// 更新配置项请求，只合并出现的字段
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateConfigurationRequest {
    pub namespace: Option<String>,
    pub key: Option<String>,
    pub value: Option<String>,
    pub description: Option<String>,
}

impl UpdateConfigurationRequest {
    pub fn is_empty(&self) -> bool {
        self.namespace.is_none()
            && self.key.is_none()
            && self.value.is_none()
            && self.description.is_none()
    }

    /// 将请求中出现的字段合并到已有配置项
    pub fn apply_to(&self, entry: &mut ConfigurationEntry) {
        if let Some(value) = &self.value {
            entry.value = value.clone();
        }
        if let Some(description) = &self.description {
            entry.description = description.clone();
        }
        if let Some(namespace) = &self.namespace {
            entry.namespace = namespace.clone();
        }
        if let Some(key) = &self.key {
            entry.key = key.clone();
        }
    }
}

/// 配置项列表查询条件
#[derive(Debug, Clone, Default)]
pub struct ConfigurationFilter {
    /// 对 namespace、key、description 做子串匹配
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}
