//! 通知引擎
//!
//! 编排一次通知尝试：免打扰判断 -> 模板渲染 -> 按优先级选渠道 -> 并发发送 -> 汇总结果。
//!
//! ## 设计说明
//!
//! - **无自身 I/O**：副作用全部委托给注入的渠道发送器
//! - **多渠道并行**：各渠道独立发送，等待全部完成，不因任一成功或失败提前返回
//! - **部分失败容忍**：任一渠道成功即整体成功
//! - **不做调度**：免打扰时直接返回推迟结果，由调用方决定何时重试

use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use reminder_shared::observability::metrics;
use tracing::{debug, error, info, instrument, warn};

use super::channels::ChannelRegistry;
use super::policy;
use super::template::TemplateRenderer;
use super::types::{ChannelResult, NotificationContext, NotificationOutcome};
use crate::models::NotificationSettings;

/// 未注册发送器的渠道返回的失败原因
pub const SENDER_NOT_REGISTERED: &str = "发送器未注册";

/// 通知引擎
pub struct NotificationEngine {
    registry: ChannelRegistry,
    renderer: TemplateRenderer,
}

impl NotificationEngine {
    pub fn new(registry: ChannelRegistry) -> Self {
        Self {
            registry,
            renderer: TemplateRenderer::new(),
        }
    }

    /// 以当前时间发送通知
    pub async fn send_notification(
        &self,
        context: &NotificationContext,
        settings: &NotificationSettings,
    ) -> NotificationOutcome {
        self.send_notification_at(context, settings, Utc::now()).await
    }

    /// 以指定时间发送通知
    #[instrument(
        skip(self, context, settings),
        fields(
            reminder_id = %context.reminder.id,
            customer_id = %context.customer.id,
            priority = %context.reminder.priority
        )
    )]
    pub async fn send_notification_at(
        &self,
        context: &NotificationContext,
        settings: &NotificationSettings,
        now: DateTime<Utc>,
    ) -> NotificationOutcome {
        if policy::is_quiet_hours(now, settings) {
            info!("处于免打扰时段，通知推迟");
            metrics::record_deferred();
            metrics::record_notification("deferred", 0.0);
            return NotificationOutcome::quiet_hours();
        }

        let start = Instant::now();

        let message = self.renderer.render_message(
            &context.template.subject,
            &context.template.body,
            &context.variables,
        );

        let channels = policy::channels_for(context.reminder.priority);
        debug!(channels = ?channels, "按优先级选定渠道");

        let send_futures = channels.iter().map(|&channel| {
            let message = &message;
            async move {
                let Some(sender) = self.registry.get(channel) else {
                    warn!(channel = %channel, "未找到该渠道的发送器");
                    return ChannelResult::failed(channel, SENDER_NOT_REGISTERED, 0);
                };

                match sender.send(context, settings, message).await {
                    Ok(result) => result,
                    Err(e) => {
                        error!(channel = %channel, error = %e, "发送器执行异常");
                        ChannelResult::failed(channel, e.to_string(), 0)
                    }
                }
            }
        });

        let channel_results = join_all(send_futures).await;

        for result in &channel_results {
            let status = if result.success { "success" } else { "failed" };
            metrics::record_channel_send(result.channel.as_str(), status);
            if !result.success {
                warn!(
                    channel = %result.channel,
                    error = ?result.error,
                    "渠道发送失败"
                );
            }
        }

        let outcome =
            NotificationOutcome::from_channel_results(channel_results).with_message(message);
        let elapsed = start.elapsed();
        metrics::record_notification(outcome.status_label(), elapsed.as_secs_f64());
        self.log_outcome(&outcome, elapsed.as_millis() as u64);

        outcome
    }

    fn log_outcome(&self, outcome: &NotificationOutcome, duration_ms: u64) {
        let success_count = outcome.success_count();
        let failure_count = outcome.failure_count();
        let total = outcome.channel_results.len();

        if !outcome.success {
            error!(failure_count, total, duration_ms, "通知发送完成（全部失败）");
        } else if outcome.is_partial_success() {
            warn!(
                success_count,
                failure_count, total, duration_ms, "通知发送完成（部分成功）"
            );
        } else {
            info!(success_count, total, duration_ms, "通知发送完成（全部成功）");
        }
    }
}
