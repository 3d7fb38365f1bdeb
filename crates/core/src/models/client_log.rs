use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 客户端日志记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientLog {
    pub id: i64,
    pub client_id: String,
    pub user_id: String,
    pub module_name: String,
    pub file_name: String,
    pub log_content: String,
    pub first_line_no: i64,
    pub end_line_no: i64,
    pub start_flag: bool,
    pub end_flag: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClientLog {
    pub fn new<C: Into<String>, M: Into<String>>(client_id: C, module_name: M) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            client_id: client_id.into(),
            user_id: String::new(),
            module_name: module_name.into(),
            file_name: String::new(),
            log_content: String::new(),
            first_line_no: 0,
            end_line_no: 0,
            start_flag: false,
            end_flag: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// 会话边界记录（会话开始或结束）
    pub fn is_session_boundary(&self) -> bool {
        self.start_flag || self.end_flag
    }
}

/// 日志上报请求
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateLogRequest {
    pub client_id: Option<String>,
    pub user_id: Option<String>,
    pub module_name: Option<String>,
    pub file_name: Option<String>,
    pub log_content: Option<String>,
    pub first_line_no: Option<i64>,
    pub end_line_no: Option<i64>,
    #[serde(default)]
    pub start_flag: bool,
    #[serde(default)]
    pub end_flag: bool,
}

/// 日志统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogStats {
    pub total_count: i64,
    pub client_counts: HashMap<String, i64>,
    pub module_counts: HashMap<String, i64>,
}

/// 按哪个维度检索日志
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogScope {
    Client(String),
    User(String),
    Module(String),
    /// 某客户端的会话边界记录
    Sessions(String),
}

impl LogScope {
    pub fn field(&self) -> &'static str {
        match self {
            LogScope::Client(_) | LogScope::Sessions(_) => "client_id",
            LogScope::User(_) => "user_id",
            LogScope::Module(_) => "module_name",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            LogScope::Client(v) | LogScope::User(v) | LogScope::Module(v) | LogScope::Sessions(v) => v,
        }
    }
}
