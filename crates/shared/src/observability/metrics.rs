//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::ObservabilityConfig;

/// Metrics 资源守卫
pub struct MetricsHandle {
    _server_handle: tokio::task::JoinHandle<()>,
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    register_common_metrics(&config.service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle {
        _server_handle: server_handle,
    })
}

/// 注册通用指标
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!("notifications_total", "Total number of notification attempts");
    metrics::describe_histogram!(
        "notification_duration_seconds",
        "Notification fan-out duration in seconds"
    );
    metrics::describe_counter!(
        "notification_channel_sends_total",
        "Total number of per-channel send attempts"
    );
    metrics::describe_counter!(
        "notifications_deferred_total",
        "Notifications suppressed by quiet hours"
    );
    metrics::describe_counter!(
        "reminders_processed_total",
        "Total number of reminders examined by the processor"
    );
    metrics::describe_gauge!(
        "worker_last_run_timestamp_seconds",
        "Unix timestamp of the last completed worker pass"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

/// 启动指标 HTTP 服务器
async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

// ============================================================================
// 便捷的指标记录函数
// ============================================================================

/// 记录一次通知发送（汇总结果）
#[inline]
pub fn record_notification(status: &str, duration_secs: f64) {
    metrics::counter!("notifications_total", "status" => status.to_string()).increment(1);
    metrics::histogram!("notification_duration_seconds", "status" => status.to_string())
        .record(duration_secs);
}

/// 记录单渠道发送
#[inline]
pub fn record_channel_send(channel: &str, status: &str) {
    metrics::counter!(
        "notification_channel_sends_total",
        "channel" => channel.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// 记录免打扰时段导致的延迟发送
#[inline]
pub fn record_deferred() {
    metrics::counter!("notifications_deferred_total").increment(1);
}

/// 记录提醒处理结果（sent / failed / deferred / skipped）
#[inline]
pub fn record_reminder_processed(outcome: &str) {
    metrics::counter!("reminders_processed_total", "outcome" => outcome.to_string()).increment(1);
}

/// 记录 Worker 最近一次完成扫描的时间
#[inline]
pub fn set_worker_last_run(worker: &str) {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default();
    metrics::gauge!("worker_last_run_timestamp_seconds", "worker" => worker.to_string()).set(now);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_functions_do_not_panic() {
        // 即使没有初始化 recorder，这些函数也不应该 panic
        record_notification("success", 0.1);
        record_channel_send("EMAIL", "failed");
        record_deferred();
        record_reminder_processed("skipped");
        set_worker_last_run("reminder_worker");
    }
}
