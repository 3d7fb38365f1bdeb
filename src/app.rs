use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use client_manager_api::{create_app, AppState};
use client_manager_core::{AppConfig, CacheService, RequestCounters};
use client_manager_domain::{ConfigurationService, FeedbackService, LogService};
use client_manager_infrastructure::{CachedConfigurationRepository, DatabaseManager, RedisCacheManager};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::{net::TcpListener, sync::broadcast};
use tracing::{info, warn};

/// 主应用程序
///
/// 持有数据库、可选的缓存和指标句柄，负责装配服务与路由并运行 HTTP 服务。
pub struct Application {
    config: AppConfig,
    database: Arc<DatabaseManager>,
    cache: Option<Arc<dyn CacheService>>,
    prometheus: Option<PrometheusHandle>,
    counters: Arc<RequestCounters>,
}

impl Application {
    /// 创建新的应用实例
    ///
    /// 数据库不可用时启动失败；Redis 不可用时告警并以无缓存模式继续。
    pub async fn new(config: AppConfig) -> Result<Self> {
        info!("初始化应用程序");

        let database = DatabaseManager::new(&config.database)
            .await
            .with_context(|| format!("连接数据库失败: {}", config.database.url))?;
        database.migrate().await.context("数据库迁移失败")?;
        let database = Arc::new(database);

        let cache = connect_cache(&config).await;
        let prometheus = install_metrics_recorder(&config);

        Ok(Self {
            config,
            database,
            cache,
            prometheus,
            counters: Arc::new(RequestCounters::new()),
        })
    }

    pub fn is_cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// 装配服务并创建路由
    pub fn router(&self) -> Router {
        let configurations = Arc::new(CachedConfigurationRepository::new(
            self.database.configuration_repository(),
            self.cache.clone(),
        ));

        let state = AppState {
            configuration_service: Arc::new(ConfigurationService::new(configurations)),
            feedback_service: Arc::new(FeedbackService::new(self.database.feedback_repository())),
            log_service: Arc::new(LogService::new(self.database.client_log_repository())),
            database: Arc::clone(&self.database),
            cache: self.cache.clone(),
            counters: Arc::clone(&self.counters),
            prometheus: self.prometheus.clone(),
        };

        create_app(state, &self.config)
    }

    /// 绑定配置中的地址并运行，直到收到关闭信号
    pub async fn run(&self, shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let listener = TcpListener::bind(&self.config.api.bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {}", self.config.api.bind_address))?;

        self.serve(listener, shutdown_rx).await
    }

    /// 在给定监听器上提供服务，关闭时等待进行中的请求完成后释放连接池
    pub async fn serve(&self, listener: TcpListener, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let address = listener.local_addr().context("读取监听地址失败")?;
        info!("API服务器启动在 http://{}", address);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("API服务器收到关闭信号");
            })
            .await
            .context("API服务器运行失败")?;

        self.database.close().await;
        info!("数据库连接池已关闭，API服务器已停止");
        Ok(())
    }
}

async fn connect_cache(config: &AppConfig) -> Option<Arc<dyn CacheService>> {
    if !config.redis.enabled {
        info!("Redis缓存未启用，配置读取直接访问数据库");
        return None;
    }

    match RedisCacheManager::new(&config.redis).await {
        Ok(manager) => {
            info!("Redis缓存已连接: {}:{}", config.redis.host, config.redis.port);
            Some(Arc::new(manager))
        }
        Err(e) => {
            warn!("连接Redis失败，以无缓存模式继续运行: {}", e);
            None
        }
    }
}

/// 安装全局 Prometheus 记录器；已安装过或指标关闭时返回 None
fn install_metrics_recorder(config: &AppConfig) -> Option<PrometheusHandle> {
    if !config.observability.metrics_enabled {
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("安装Prometheus指标记录器失败: {}", e);
            None
        }
    }
}
