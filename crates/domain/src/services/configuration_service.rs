use std::sync::Arc;

use client_manager_core::{
    ConfigurationEntry, ConfigurationFilter, ConfigurationRepository, CreateConfigurationRequest,
    ManagerError, ManagerResult, Page, PageRequest, UpdateConfigurationRequest,
};
use tracing::{info, instrument, warn};

use super::validation::require;

/// 配置项服务
///
/// 仓储可以是数据库实现，也可以是缓存装饰实现；两者对服务的可见行为一致。
pub struct ConfigurationService {
    repository: Arc<dyn ConfigurationRepository>,
}

impl ConfigurationService {
    pub fn new(repository: Arc<dyn ConfigurationRepository>) -> Self {
        Self { repository }
    }

    /// 按复合键读取配置项
    #[instrument(skip(self))]
    pub async fn get_configuration(&self, namespace: &str, key: &str) -> ManagerResult<ConfigurationEntry> {
        require("namespace", Some(namespace))?;
        require("key", Some(key))?;

        self.repository
            .get_by_key(namespace, key)
            .await?
            .ok_or_else(|| ManagerError::ConfigurationNotFound {
                namespace: namespace.to_string(),
                key: key.to_string(),
            })
    }

    #[instrument(skip(self))]
    pub async fn get_configurations_by_namespace(&self, namespace: &str) -> ManagerResult<Vec<ConfigurationEntry>> {
        require("namespace", Some(namespace))?;
        self.repository.list_by_namespace(namespace).await
    }

    #[instrument(skip(self))]
    pub async fn list_configurations(
        &self,
        page: PageRequest,
        search: Option<&str>,
    ) -> ManagerResult<Page<ConfigurationEntry>> {
        let page = page.normalized();
        let filter = ConfigurationFilter {
            search: search
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            limit: page.limit(),
            offset: page.offset(),
        };

        let total = self.repository.count(&filter).await?;
        let items = self.repository.list(&filter).await?;

        Ok(Page::new(items, total, page))
    }

    /// 创建配置项
    ///
    /// 先在持久化存储中按复合键查重，存在则返回 `Conflict`。
    /// 并发创建绕过查重时由存储层唯一索引兜底，同样映射为 `Conflict`。
    #[instrument(skip(self, request), fields(namespace = ?request.namespace, key = ?request.key))]
    pub async fn create_configuration(
        &self,
        request: CreateConfigurationRequest,
    ) -> ManagerResult<ConfigurationEntry> {
        let namespace = require("namespace", request.namespace.as_deref())?;
        let key = require("key", request.key.as_deref())?;

        if self.repository.exists_by_key(namespace, key).await? {
            warn!("配置项已存在: {}/{}", namespace, key);
            return Err(ManagerError::Conflict("configuration already exists".to_string()));
        }

        let entry = ConfigurationEntry::new(namespace, key, request.value.unwrap_or_default())
            .with_description(request.description.unwrap_or_default());

        let created = self.repository.create(&entry).await?;
        info!("配置项创建成功: {}/{} (ID: {})", created.namespace, created.key, created.id);
        Ok(created)
    }

    /// 按ID部分更新配置项，只合并请求中出现的字段
    #[instrument(skip(self, request))]
    pub async fn update_configuration(
        &self,
        id: i64,
        request: UpdateConfigurationRequest,
    ) -> ManagerResult<ConfigurationEntry> {
        if request.namespace.is_some() {
            require("namespace", request.namespace.as_deref())?;
        }
        if request.key.is_some() {
            require("key", request.key.as_deref())?;
        }

        let mut entry = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(ManagerError::ConfigurationIdNotFound { id })?;

        request.apply_to(&mut entry);

        let updated = self.repository.update(&entry).await?;
        info!("配置项更新成功: ID {}", id);
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_configuration(&self, id: i64) -> ManagerResult<()> {
        self.repository.delete(id).await?;
        info!("配置项删除成功: ID {}", id);
        Ok(())
    }
}
