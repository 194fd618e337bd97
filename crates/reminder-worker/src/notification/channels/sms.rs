//! SMS 短信通知渠道
//!
//! 设置关闭短信或客户没有手机号时不可用。

use std::sync::Arc;

use async_trait::async_trait;

use super::{ChannelResult, ChannelSender, DeliveryGateway, dispatch_via_gateway};
use crate::error::Result;
use crate::models::{Channel, NotificationSettings};
use crate::notification::types::{NotificationContext, RenderedMessage};

pub const SMS_DISABLED: &str = "短信通知已关闭";
pub const NO_PHONE_NUMBER: &str = "客户未登记手机号";

/// SMS 短信通知渠道
pub struct SmsChannel {
    gateway: Arc<dyn DeliveryGateway>,
}

impl SmsChannel {
    pub fn new(gateway: Arc<dyn DeliveryGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl ChannelSender for SmsChannel {
    fn channel(&self) -> Channel {
        Channel::Sms
    }

    fn name(&self) -> &str {
        "SMS"
    }

    fn unavailable_reason(
        &self,
        context: &NotificationContext,
        settings: &NotificationSettings,
    ) -> Option<String> {
        if !settings.sms_enabled {
            return Some(SMS_DISABLED.to_string());
        }
        if !context.customer.has_phone() {
            return Some(NO_PHONE_NUMBER.to_string());
        }
        None
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

        let phone = context.customer.phone.as_deref().unwrap_or_default();
        Ok(dispatch_via_gateway(self.gateway.as_ref(), self.channel(), phone, message).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::channels::MockDeliveryGateway;
    use crate::notification::channels::test_support::{make_context, make_message};

    fn sms_settings() -> NotificationSettings {
        let mut settings = NotificationSettings::default_for("user-1");
        settings.sms_enabled = true;
        settings
    }

    #[tokio::test]
    async fn test_sms_sends_to_phone() {
        let mut gateway = MockDeliveryGateway::new();
        gateway
            .expect_dispatch()
            .withf(|channel, destination, _, body| {
                *channel == Channel::Sms && destination == "+15550100" && body.starts_with("Hello")
            })
            .times(1)
            .returning(|_, _, _, _| Ok("sms-1".to_string()));

        let channel = SmsChannel::new(Arc::new(gateway));
        let result = channel
            .send(&make_context(Some("+15550100")), &sms_settings(), &make_message())
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.external_message_id.as_deref(), Some("sms-1"));
    }

    #[tokio::test]
    async fn test_sms_disabled() {
        let mut gateway = MockDeliveryGateway::new();
        gateway.expect_dispatch().never();

        let channel = SmsChannel::new(Arc::new(gateway));
        let result = channel
            .send(
                &make_context(Some("+15550100")),
                &NotificationSettings::default_for("user-1"),
                &make_message(),
            )
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some(SMS_DISABLED));
    }

    #[tokio::test]
    async fn test_sms_without_phone() {
        let mut gateway = MockDeliveryGateway::new();
        gateway.expect_dispatch().never();

        let channel = SmsChannel::new(Arc::new(gateway));
        let result = channel
            .send(&make_context(None), &sms_settings(), &make_message())
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some(NO_PHONE_NUMBER));
    }
}
