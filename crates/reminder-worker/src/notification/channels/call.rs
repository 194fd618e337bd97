//! Call 语音呼叫渠道
//!
//! 没有独立的设置开关，客户登记了手机号就会尝试呼叫。

use std::sync::Arc;

use async_trait::async_trait;

use super::sms::NO_PHONE_NUMBER;
use super::{ChannelResult, ChannelSender, DeliveryGateway, dispatch_via_gateway};
use crate::error::Result;
use crate::models::{Channel, NotificationSettings};
use crate::notification::types::{NotificationContext, RenderedMessage};

/// Call 语音呼叫渠道
pub struct CallChannel {
    gateway: Arc<dyn DeliveryGateway>,
}

impl CallChannel {
    pub fn new(gateway: Arc<dyn DeliveryGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl ChannelSender for CallChannel {
    fn channel(&self) -> Channel {
        Channel::Call
    }

    fn name(&self) -> &str {
        "Call"
    }

    fn unavailable_reason(
        &self,
        context: &NotificationContext,
        _settings: &NotificationSettings,
    ) -> Option<String> {
        (!context.customer.has_phone()).then(|| NO_PHONE_NUMBER.to_string())
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
