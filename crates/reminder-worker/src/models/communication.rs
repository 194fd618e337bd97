//! 沟通记录模型
//!
//! 每次处理尝试生成一条，由处理器持久化；通知引擎本身不写入。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{Channel, CommunicationStatus};

/// 沟通记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Communication {
    pub id: String,
    pub reminder_id: String,
    pub customer_id: String,
    pub channel: Channel,
    pub status: CommunicationStatus,
    pub sent_at: Option<DateTime<Utc>>,
    /// 收件地址（邮箱或手机号），无可用地址时为客户 ID
    pub recipient: String,
    pub subject: String,
    /// 渲染后的正文
    pub content: String,
    pub error_message: Option<String>,
    /// 仅作计数，不驱动任何重试调度
    pub retry_count: u32,
    pub created_at: DateTime<Utc>,
}

impl Communication {
    pub fn new(
        reminder_id: impl Into<String>,
        customer_id: impl Into<String>,
        channel: Channel,
        recipient: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            reminder_id: reminder_id.into(),
            customer_id: customer_id.into(),
            channel,
            status: CommunicationStatus::Pending,
            sent_at: None,
            recipient: recipient.into(),
            subject: String::new(),
            content: String::new(),
            error_message: None,
            retry_count: 0,
            created_at,
        }
    }

    pub fn with_content(mut self, subject: impl Into<String>, content: impl Into<String>) -> Self {
        self.subject = subject.into();
        self.content = content.into();
        self
    }

    /// 标记为已发送
    pub fn mark_sent(mut self, sent_at: DateTime<Utc>) -> Self {
        self.status = CommunicationStatus::Sent;
        self.sent_at = Some(sent_at);
        self.error_message = None;
        self
    }

    /// 标记为失败
    pub fn mark_failed(mut self, error: impl Into<String>) -> Self {
        self.status = CommunicationStatus::Failed;
        self.error_message = Some(error.into());
        self
    }

    /// 保持待发送状态并记录原因（免打扰推迟）
    pub fn mark_pending(mut self, reason: impl Into<String>) -> Self {
        self.status = CommunicationStatus::Pending;
        self.error_message = Some(reason.into());
        self
    }
}
