//! 提醒轮询 Worker
//!
//! 以固定间隔扫描所有拥有提醒的用户，逐个调用处理器。
//! 收到关闭信号后在当前批次结束时退出。

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reminder_shared::observability::metrics;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crate::error::Result;
use crate::processor::{ProcessingSummary, ReminderProcessor};
use crate::repository::ReminderRepository;

/// 提醒轮询 Worker
pub struct ReminderWorker {
    processor: Arc<ReminderProcessor>,
    reminders: Arc<dyn ReminderRepository>,
    poll_interval: Duration,
}

impl ReminderWorker {
    /// # 参数
    /// - `processor`: 提醒处理器
    /// - `reminders`: 用于列出需要扫描的用户
    /// - `poll_interval_secs`: 轮询间隔（秒）
    pub fn new(
        processor: Arc<ReminderProcessor>,
        reminders: Arc<dyn ReminderRepository>,
        poll_interval_secs: u64,
    ) -> Self {
        Self {
            processor,
            reminders,
            poll_interval: Duration::from_secs(poll_interval_secs.max(1)),
        }
    }

    /// 主循环：每个周期执行一轮，直到收到关闭信号
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(poll_interval = ?self.poll_interval, "ReminderWorker 已启动");

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_once().await {
                        error!(error = %e, "提醒扫描出错");
                    }
                    metrics::set_worker_last_run("reminder_worker");
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("ReminderWorker 已停止");
    }

    /// 执行一轮扫描
    ///
    /// 单个用户的批次失败只记录日志，继续处理其他用户
    pub async fn run_once(&self) -> Result<ProcessingSummary> {
        let now = Utc::now();
        let user_ids = self.reminders.list_user_ids().await?;

        let mut total = ProcessingSummary::default();
        for user_id in &user_ids {
            match self.processor.process_due(user_id, now).await {
                Ok(summary) => total.merge(summary),
                Err(e) => error!(user_id = %user_id, error = %e, "用户提醒批次处理失败"),
            }
        }

        info!(
            users = user_ids.len(),
            examined = total.examined,
            sent = total.sent,
            failed = total.failed,
            deferred = total.deferred,
            "本轮提醒扫描完成"
        );
        Ok(total)
    }
}
