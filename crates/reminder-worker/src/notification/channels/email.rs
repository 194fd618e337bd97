//! Email 邮件通知渠道
//!
//! 通过注入的 `Mailer` 投递，HTML 正文由纯文本换行转换而来。

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{ChannelResult, ChannelSender};
use crate::error::Result;
use crate::models::{Channel, NotificationSettings};
use crate::notification::mailer::{EmailMessage, Mailer};
use crate::notification::types::{NotificationContext, RenderedMessage};

pub const EMAIL_DISABLED: &str = "邮件通知已关闭";
pub const NO_EMAIL_ADDRESS: &str = "客户未登记邮箱地址";

/// Email 邮件通知渠道
pub struct EmailChannel {
    mailer: Arc<dyn Mailer>,
}

impl EmailChannel {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }
}

#[async_trait]
impl ChannelSender for EmailChannel {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    fn name(&self) -> &str {
        "Email"
    }

    fn unavailable_reason(
        &self,
        context: &NotificationContext,
        settings: &NotificationSettings,
    ) -> Option<String> {
        if !settings.email_enabled {
            return Some(EMAIL_DISABLED.to_string());
        }
        if !context.customer.has_email() {
            return Some(NO_EMAIL_ADDRESS.to_string());
        }
        None
    }

    async fn send(
        &self,
        context: &NotificationContext,
        settings: &NotificationSettings,
        message: &RenderedMessage,
    ) -> Result<ChannelResult> {
        let start = Instant::now();

        if let Some(reason) = self.unavailable_reason(context, settings) {
            debug!(
                reminder_id = %context.reminder.id,
                reason = %reason,
                "跳过 Email"
            );
            return Ok(ChannelResult::failed(self.channel(), reason, 0));
        }

        let to = context.customer.email.clone().unwrap_or_default();
        let email = EmailMessage::from_text(to, &message.subject, &message.body);

        match self.mailer.deliver(email).await {
            Ok(message_id) => Ok(ChannelResult::success(
                self.channel(),
                Some(message_id),
                start.elapsed().as_millis() as u64,
            )),
            Err(e) => {
                warn!(
                    reminder_id = %context.reminder.id,
                    error = %e,
                    "Email 投递失败"
                );
                Ok(ChannelResult::failed(
                    self.channel(),
                    e.to_string(),
                    start.elapsed().as_millis() as u64,
                ))
            }
        }
    }
}
