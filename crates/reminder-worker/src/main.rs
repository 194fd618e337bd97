//! 提醒 Worker 入口
//!
//! 组装配置、可观测性、邮件发送器、渠道、通知引擎、存储与处理器，周期性扫描提醒。

use std::sync::Arc;

use anyhow::Result;
use reminder_shared::{config::AppConfig, observability};
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

use reminder_worker::{
    ChannelRegistry, MemoryStore, NotificationEngine, ReminderProcessor, ReminderWorker,
    Repositories, SmtpMailer, notification::LoggingGateway,
};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. 加载配置
    let config = AppConfig::load("reminder-worker").unwrap_or_else(|e| {
        warn!(code = e.code(), "Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    // 2. 初始化可观测性
    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    info!("Starting reminder-worker...");
    info!(
        environment = %config.environment,
        production = config.is_production(),
        "Configuration loaded"
    );

    // 3. 邮件发送器与渠道
    let mailer = Arc::new(SmtpMailer::new(&config.smtp)?);
    info!(smtp_enabled = mailer.is_enabled(), "Mailer initialized");

    let registry = ChannelRegistry::with_defaults(mailer, Arc::new(LoggingGateway));
    let engine = Arc::new(NotificationEngine::new(registry));

    // 4. 存储与处理器
    let store = Arc::new(MemoryStore::new());
    let repos = Repositories::from_store(store.clone());
    let processor = Arc::new(ReminderProcessor::new(
        repos,
        engine,
        config.worker.company_name.clone(),
    ));
    info!("Processor initialized");

    if !config.worker.enabled {
        info!("Reminder worker disabled by configuration, exiting");
        return Ok(());
    }

    // 5. 启动 Worker
    let worker = ReminderWorker::new(processor, store, config.worker.poll_interval_secs);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move { worker.run(shutdown_rx).await });

    shutdown_signal().await;
    let _ = shutdown_tx.send(true);
    handle.await?;

    info!("Service shutdown complete");
    Ok(())
}

/// 优雅关闭信号处理
///
/// 监听 Ctrl+C 和 SIGTERM 信号
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        }
    }
}
