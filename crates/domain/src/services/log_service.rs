use std::sync::Arc;

use client_manager_core::{
    ClientLog, ClientLogRepository, CreateLogRequest, LogScope, LogStats, ManagerResult, Page, PageRequest,
};
use tracing::{info, instrument};

use super::validation::{parse_date, parse_date_range, require, DateBound};

pub struct LogService {
    repository: Arc<dyn ClientLogRepository>,
}

impl LogService {
    pub fn new(repository: Arc<dyn ClientLogRepository>) -> Self {
        Self { repository }
    }

    /// 写入一条客户端日志，client_id 与 module_name 必填
    #[instrument(skip(self, request), fields(client_id = ?request.client_id, module_name = ?request.module_name))]
    pub async fn create_log(&self, request: CreateLogRequest) -> ManagerResult<ClientLog> {
        let client_id = require("client_id", request.client_id.as_deref())?;
        let module_name = require("module_name", request.module_name.as_deref())?;

        let mut log = ClientLog::new(client_id, module_name);
        log.user_id = request.user_id.clone().unwrap_or_default();
        log.file_name = request.file_name.clone().unwrap_or_default();
        log.log_content = request.log_content.clone().unwrap_or_default();
        log.first_line_no = request.first_line_no.unwrap_or_default();
        log.end_line_no = request.end_line_no.unwrap_or_default();
        log.start_flag = request.start_flag;
        log.end_flag = request.end_flag;

        let created = self.repository.create(&log).await?;

        metrics::counter!(
            "logs_received_total",
            "client_id" => created.client_id.clone(),
            "module" => created.module_name.clone()
        )
        .increment(1);

        info!("客户端日志写入成功: ID {}", created.id);
        Ok(created)
    }

    pub async fn get_logs_by_client(&self, client_id: &str, page: PageRequest) -> ManagerResult<Page<ClientLog>> {
        require("client_id", Some(client_id))?;
        self.list(LogScope::Client(client_id.to_string()), page).await
    }

    pub async fn get_logs_by_user(&self, user_id: &str, page: PageRequest) -> ManagerResult<Page<ClientLog>> {
        require("user_id", Some(user_id))?;
        self.list(LogScope::User(user_id.to_string()), page).await
    }

    pub async fn get_logs_by_module(&self, module_name: &str, page: PageRequest) -> ManagerResult<Page<ClientLog>> {
        require("module_name", Some(module_name))?;
        self.list(LogScope::Module(module_name.to_string()), page).await
    }

    /// 客户端的会话边界日志（start_flag 或 end_flag）
    pub async fn get_log_sessions(&self, client_id: &str, page: PageRequest) -> ManagerResult<Page<ClientLog>> {
        require("client_id", Some(client_id))?;
        self.list(LogScope::Sessions(client_id.to_string()), page).await
    }

    #[instrument(skip(self))]
    pub async fn get_log_stats(&self, start_date: Option<&str>, end_date: Option<&str>) -> ManagerResult<LogStats> {
        let (start, end) = parse_date_range(start_date, end_date)?;
        self.repository.stats(start, end).await
    }

    /// 清理早于 before_date 的日志，返回删除条数
    #[instrument(skip(self))]
    pub async fn delete_old_logs(&self, before_date: Option<&str>) -> ManagerResult<u64> {
        let before = parse_date("before_date", before_date, DateBound::Start)?;
        let deleted = self.repository.delete_before(before).await?;
        info!("已清理 {} 条早于 {} 的日志", deleted, before);
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn list(&self, scope: LogScope, page: PageRequest) -> ManagerResult<Page<ClientLog>> {
        let page = page.normalized();
        let total = self.repository.count(&scope).await?;
        let items = self.repository.list(&scope, page).await?;
        Ok(Page::new(items, total, page))
    }
}
