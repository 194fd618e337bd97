//! Push 推送通知渠道
//!
//! 以客户 ID 作为推送目标，仅受设置中的推送开关控制。

use std::sync::Arc;

use async_trait::async_trait;

use super::{ChannelResult, ChannelSender, DeliveryGateway, dispatch_via_gateway};
use crate::error::Result;
use crate::models::{Channel, NotificationSettings};
use crate::notification::types::{NotificationContext, RenderedMessage};

pub const PUSH_DISABLED: &str = "推送通知已关闭";

/// Push 推送通知渠道
pub struct PushChannel {
    gateway: Arc<dyn DeliveryGateway>,
}

impl PushChannel {
    pub fn new(gateway: Arc<dyn DeliveryGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl ChannelSender for PushChannel {
    fn channel(&self) -> Channel {
        Channel::Push
    }

    fn name(&self) -> &str {
        "Push"
    }

    fn unavailable_reason(
        &self,
        _context: &NotificationContext,
        settings: &NotificationSettings,
    ) -> Option<String> {
        (!settings.push_enabled).then(|| PUSH_DISABLED.to_string())
    }

    async fn send(
        &self,
        context: &NotificationContext,
        settings: &NotificationSettings,
        message: &RenderedMessage,
    ) -> Result<ChannelResult> {
        if let Some(reason) = self.unavailable_reason(context, settings) {
            return Ok(ChannelResult::failed(self.channel(), reason, 0));
        }

        Ok(dispatch_via_gateway(
            self.gateway.as_ref(),
            self.channel(),
            &context.customer.id,
            message,
        )
        .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::channels::LoggingGateway;
    use crate::notification::channels::test_support::{make_context, make_message};

    #[tokio::test]
    async fn test_push_enabled_by_default() {
        let channel = PushChannel::new(Arc::new(LoggingGateway));
        let result = channel
            .send(
                &make_context(None),
                &NotificationSettings::default_for("user-1"),
                &make_message(),
            )
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.channel, Channel::Push);
    }

    #[tokio::test]
    async fn test_push_disabled() {
        let mut settings = NotificationSettings::default_for("user-1");
        settings.push_enabled = false;

        let channel = PushChannel::new(Arc::new(LoggingGateway));
        let result = channel
            .send(&make_context(None), &settings, &make_message())
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some(PUSH_DISABLED));
    }
}
