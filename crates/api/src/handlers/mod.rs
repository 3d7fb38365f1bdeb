pub mod configurations;
pub mod feedbacks;
pub mod health;
pub mod logs;
pub mod metrics;

use client_manager_core::PageRequest;
use serde::Deserialize;

/// 分页查询参数
///
/// 无法解析的数值按缺省处理，越界值由服务层规整。
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl PageQuery {
    pub fn to_page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        let parse = |raw: &Option<String>, fallback: i64| {
            raw.as_deref()
                .and_then(|v| v.trim().parse::<i64>().ok())
                .unwrap_or(fallback)
        };

        PageRequest::new(parse(&self.page, defaults.page), parse(&self.page_size, defaults.page_size))
    }
}

/// 统计区间查询参数
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}
