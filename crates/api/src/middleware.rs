use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use client_manager_core::{ApiConfig, RequestCounters};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    info!("开始处理请求: {} {}", method, uri);

    let response = next.run(request).await;
    let duration = start.elapsed();

    info!(
        "完成请求处理: {} {} - 状态: {} - 耗时: {:?}",
        method,
        uri,
        response.status(),
        duration
    );

    response
}

/// 请求计数与 Prometheus 指标
///
/// path 标签取路由模板（如 `/configurations/{id}`），未匹配的路由统一记为 `unmatched`。
pub async fn track_requests(
    State(counters): State<Arc<RequestCounters>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = Instant::now();

    let guard = InFlightGuard::start(counters);
    let response = next.run(request).await;

    let status = response.status().as_u16();
    guard.finish(status);

    let status_label = status.to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status_label.clone()
    )
    .increment(1);
    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.clone(),
        "path" => path.clone()
    )
    .record(start.elapsed().as_secs_f64());

    if status >= 400 {
        metrics::counter!(
            "http_errors_total",
            "method" => method,
            "path" => path,
            "status" => status_label
        )
        .increment(1);
    }

    response
}

/// 在途请求守卫
///
/// 请求 future 在完成前被丢弃时（客户端断开、处理器 panic），由 `Drop` 回收在途计数。
struct InFlightGuard {
    counters: Arc<RequestCounters>,
    finished: bool,
}

impl InFlightGuard {
    fn start(counters: Arc<RequestCounters>) -> Self {
        counters.request_started();
        metrics::gauge!("http_active_connections").increment(1.0);
        Self {
            counters,
            finished: false,
        }
    }

    fn finish(mut self, status: u16) {
        self.finished = true;
        self.counters.request_finished(status);
        metrics::gauge!("http_active_connections").decrement(1.0);
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if !self.finished {
            warn!("请求未完成即被丢弃");
            self.counters.request_abandoned();
            metrics::gauge!("http_active_connections").decrement(1.0);
        }
    }
}

/// 按配置构造 CORS 层，`*` 表示放开所有来源
pub fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    if config.cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("忽略无效的CORS来源: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}

pub fn trace_layer(
) -> TraceLayer<tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>>
{
    TraceLayer::new_for_http()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get, Router};
    use std::time::Duration;
    use tower::ServiceExt;

    fn tracked(counters: Arc<RequestCounters>) -> Router {
        Router::new()
            .route("/ok", get(|| async { "ok" }))
            .route("/stuck", get(|| std::future::pending::<&'static str>()))
            .route("/boom", get(boom))
            .layer(axum::middleware::from_fn_with_state(counters, track_requests))
    }

    async fn boom() -> &'static str {
        panic!("handler failure")
    }

    fn get_request(path: &str) -> Request {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_completed_request_is_counted() {
        let counters = Arc::new(RequestCounters::new());
        let response = tracked(counters.clone()).oneshot(get_request("/ok")).await.unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(counters.request_count(), 1);
        assert_eq!(counters.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_dropped_request_releases_in_flight() {
        let counters = Arc::new(RequestCounters::new());
        let router = tracked(counters.clone());

        let result = tokio::time::timeout(Duration::from_millis(50), router.oneshot(get_request("/stuck"))).await;
        assert!(result.is_err());
        assert_eq!(counters.in_flight(), 0);
        assert_eq!(counters.request_count(), 0);
    }

    #[tokio::test]
    async fn test_panicking_handler_releases_in_flight() {
        let counters = Arc::new(RequestCounters::new());
        let router = tracked(counters.clone());

        let handle = tokio::spawn(async move { router.oneshot(get_request("/boom")).await });
        assert!(handle.await.unwrap_err().is_panic());
        assert_eq!(counters.in_flight(), 0);
    }
}
