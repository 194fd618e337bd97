//! 通知渠道实现
//!
//! 定义统一的渠道发送器 trait，并按渠道类型注册到 `ChannelRegistry`。
//!
//! ## 支持的渠道
//!
//! - **Email**: 通过 `Mailer` 投递（SMTP）
//! - **SMS**: 短信网关
//! - **Push**: 推送网关
//! - **Call**: 语音呼叫网关
//!
//! 引擎不会按设置预先过滤渠道，被关闭的渠道同样会被调用并返回失败原因。

mod call;
mod email;
mod push;
mod sms;

pub use call::CallChannel;
pub use email::EmailChannel;
pub use push::PushChannel;
pub use sms::SmsChannel;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use super::types::{ChannelResult, NotificationContext, RenderedMessage};
use crate::error::Result;
use crate::models::{Channel, NotificationSettings};

/// 渠道发送器 trait
///
/// 实现应当无状态，便于并发调用。
#[async_trait]
pub trait ChannelSender: Send + Sync {
    /// 渠道类型标识
    fn channel(&self) -> Channel;

    /// 渠道名称（用于日志）
    fn name(&self) -> &str;

    /// 渠道不可用的原因，可用时返回 None
    ///
    /// 例如设置中关闭了该渠道，或客户没有手机号
    fn unavailable_reason(
        &self,
        context: &NotificationContext,
        settings: &NotificationSettings,
    ) -> Option<String>;

    /// 发送通知
    ///
    /// 投递失败应返回 `ChannelResult::failed` 而非 Err；
    /// 返回 Err 时引擎同样会将其转换为失败的渠道结果。
    async fn send(
        &self,
        context: &NotificationContext,
        settings: &NotificationSettings,
        message: &RenderedMessage,
    ) -> Result<ChannelResult>;
}

/// 非邮件渠道的投递网关
///
/// 短信、推送、语音呼叫共享同一形态：目标地址 + 标题 + 正文，成功时返回外部消息 ID
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeliveryGateway: Send + Sync {
    async fn dispatch(
        &self,
        channel: Channel,
        destination: &str,
        subject: &str,
        body: &str,
    ) -> Result<String>;
}

/// 模拟投递网关
///
/// 仅记录日志并返回成功。生产环境替换为短信服务商、APNs / FCM、语音平台的 SDK 调用
#[derive(Debug, Default, Clone)]
pub struct LoggingGateway;

#[async_trait]
impl DeliveryGateway for LoggingGateway {
    async fn dispatch(
        &self,
        channel: Channel,
        destination: &str,
        subject: &str,
        body: &str,
    ) -> Result<String> {
        let message_id = Uuid::now_v7().to_string();

        info!(
            channel = %channel,
            destination = %destination,
            message_id = %message_id,
            subject = %subject,
            body_length = body.len(),
            "模拟发送通知"
        );

        Ok(message_id)
    }
}

/// 通过网关发送并计时，供非邮件渠道复用
pub(crate) async fn dispatch_via_gateway(
    gateway: &dyn DeliveryGateway,
    channel: Channel,
    destination: &str,
    message: &RenderedMessage,
) -> ChannelResult {
    let start = Instant::now();

    match gateway
        .dispatch(channel, destination, &message.subject, &message.body)
        .await
    {
        Ok(message_id) => ChannelResult::success(
            channel,
            Some(message_id),
            start.elapsed().as_millis() as u64,
        ),
        Err(e) => {
            warn!(channel = %channel, error = %e, "网关投递失败");
            ChannelResult::failed(channel, e.to_string(), start.elapsed().as_millis() as u64)
        }
    }
}

/// 渠道注册表
///
/// 渠道类型到发送器实现的映射
#[derive(Clone, Default)]
pub struct ChannelRegistry {
    senders: HashMap<Channel, Arc<dyn ChannelSender>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册全部四个渠道：邮件走 mailer，其余走同一个网关
    pub fn with_defaults(
        mailer: Arc<dyn super::mailer::Mailer>,
        gateway: Arc<dyn DeliveryGateway>,
    ) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(EmailChannel::new(mailer)));
        registry.register(Arc::new(SmsChannel::new(gateway.clone())));
        registry.register(Arc::new(PushChannel::new(gateway.clone())));
        registry.register(Arc::new(CallChannel::new(gateway)));
        registry
    }

    /// 注册发送器，同一渠道后注册的覆盖先注册的
    pub fn register(&mut self, sender: Arc<dyn ChannelSender>) {
        info!(
            channel = %sender.channel(),
            name = sender.name(),
            "注册通知渠道"
        );
        self.senders.insert(sender.channel(), sender);
    }

    pub fn get(&self, channel: Channel) -> Option<&Arc<dyn ChannelSender>> {
        self.senders.get(&channel)
    }

    /// 已注册的渠道类型
    pub fn channels(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|c| self.senders.contains_key(c))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;

    use super::*;
    use crate::models::{Customer, Priority};
    use crate::notification::types::{ReminderSnapshot, TemplateSnapshot};

    pub fn make_context(phone: Option<&str>) -> NotificationContext {
        NotificationContext::new(
            Customer {
                id: "cust-1".to_string(),
                name: "Ada Lovelace".to_string(),
                email: Some("ada@example.com".to_string()),
                phone: phone.map(str::to_string),
            },
            ReminderSnapshot {
                id: "rem-1".to_string(),
                product: "Boiler service".to_string(),
                next_due: Utc::now(),
                priority: Priority::Urgent,
                escalation_level: 0,
                template_id: None,
            },
            TemplateSnapshot {
                subject: "{{product}} due".to_string(),
                body: "Hello {{customerName}}".to_string(),
                channel: Channel::Email,
            },
        )
    }

    pub fn make_message() -> RenderedMessage {
        RenderedMessage {
            subject: "Boiler service due".to_string(),
            body: "Hello Ada\nSee you soon".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReminderError;
    use crate::notification::mailer::MockMailer;

    #[test]
    fn test_registry_with_defaults_registers_all_channels() {
        let registry = ChannelRegistry::with_defaults(
            Arc::new(MockMailer::new()),
            Arc::new(LoggingGateway),
        );
        assert_eq!(registry.channels(), Channel::ALL.to_vec());
        assert_eq!(
            registry.get(Channel::Call).map(|s| s.channel()),
            Some(Channel::Call)
        );
    }

    #[test]
    fn test_empty_registry() {
        let registry = ChannelRegistry::new();
        assert!(registry.get(Channel::Email).is_none());
        assert!(registry.channels().is_empty());
    }

    #[tokio::test]
    async fn test_logging_gateway_succeeds() {
        let result = dispatch_via_gateway(
            &LoggingGateway,
            Channel::Sms,
            "+15550100",
            &test_support::make_message(),
        )
        .await;

        assert!(result.success);
        assert_eq!(result.channel, Channel::Sms);
        assert!(result.external_message_id.is_some());
    }

    #[tokio::test]
    async fn test_gateway_error_becomes_failed_result() {
        let mut gateway = MockDeliveryGateway::new();
        gateway.expect_dispatch().times(1).returning(|channel, _, _, _| {
            Err(ReminderError::Delivery {
                channel: channel.to_string(),
                reason: "gateway timeout".to_string(),
            })
        });

        let result = dispatch_via_gateway(
            &gateway,
            Channel::Push,
            "cust-1",
            &test_support::make_message(),
        )
        .await;

        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("渠道投递失败: 渠道=PUSH, 原因=gateway timeout")
        );
    }
}
