//! 进程内请求计数器
//!
//! `RequestCounters` 由启动代码创建一次，通过 axum 状态注入请求中间件，
//! 健康检查接口读取它的快照。测试可以各自创建独立实例。

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Thread-safe request/error counters
#[derive(Debug)]
pub struct RequestCounters {
    /// Total handled requests
    requests: AtomicU64,
    /// Requests that finished with status >= 400
    errors: AtomicU64,
    /// Requests currently being processed
    in_flight: AtomicI64,
    started_at: DateTime<Utc>,
    started: Instant,
}

/// Point-in-time view of the counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub total_requests: u64,
    pub total_errors: u64,
    pub in_flight: i64,
    pub error_rate: f64,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: u64,
}

impl RequestCounters {
    pub fn new() -> Self {
        Self {
            requests: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            in_flight: AtomicI64::new(0),
            started_at: Utc::now(),
            started: Instant::now(),
        }
    }

    /// 请求开始
    pub fn request_started(&self) {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
    }

    /// 请求结束，按状态码记录错误
    pub fn request_finished(&self, status: u16) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
        self.requests.fetch_add(1, Ordering::Relaxed);
        if status >= 400 {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// 请求未产生响应就被丢弃，只回收在途计数
    pub fn request_abandoned(&self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn error_count(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn in_flight(&self) -> i64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        let total_requests = self.request_count();
        let total_errors = self.error_count();
        let error_rate = if total_requests == 0 {
            0.0
        } else {
            total_errors as f64 / total_requests as f64
        };

        CounterSnapshot {
            total_requests,
            total_errors,
            in_flight: self.in_flight(),
            error_rate,
            started_at: self.started_at,
            uptime_seconds: self.uptime().as_secs(),
        }
    }
}

impl Default for RequestCounters {
    fn default() -> Self {
        Self::new()
    }
}
