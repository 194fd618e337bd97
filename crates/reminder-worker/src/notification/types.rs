//! 通知类型定义
//!
//! 定义一次通知尝试所需的上下文，以及渠道级和汇总级的发送结果。

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Channel, Customer, Priority, Reminder, ReminderTemplate};

/// 免打扰时段内直接返回的错误信息
pub const QUIET_HOURS_ERROR: &str = "quiet hours - notification scheduled for later";

/// 所有渠道均失败时的汇总错误信息
pub const ALL_CHANNELS_FAILED: &str = "All notification channels failed";

/// 提醒快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSnapshot {
    pub id: String,
    pub product: String,
    pub next_due: DateTime<Utc>,
    pub priority: Priority,
    pub escalation_level: u32,
    pub template_id: Option<String>,
}

impl From<&Reminder> for ReminderSnapshot {
    fn from(reminder: &Reminder) -> Self {
        Self {
            id: reminder.id.clone(),
            product: reminder.product.clone(),
            next_due: reminder.next_due,
            priority: reminder.priority,
            escalation_level: reminder.escalation_level,
            template_id: reminder.template_id.clone(),
        }
    }
}

/// 已解析的模板（未渲染）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSnapshot {
    pub subject: String,
    pub body: String,
    pub channel: Channel,
}

impl From<&ReminderTemplate> for TemplateSnapshot {
    fn from(template: &ReminderTemplate) -> Self {
        Self {
            subject: template.subject.clone(),
            body: template.body.clone(),
            channel: template.channel,
        }
    }
}

/// 通知上下文
///
/// 每次发送临时构建，不做持久化
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationContext {
    pub customer: Customer,
    pub reminder: ReminderSnapshot,
    pub template: TemplateSnapshot,
    /// 模板变量（customerName、product、dueDate 等）
    pub variables: HashMap<String, serde_json::Value>,
}

impl NotificationContext {
    pub fn new(customer: Customer, reminder: ReminderSnapshot, template: TemplateSnapshot) -> Self {
        Self {
            customer,
            reminder,
            template,
            variables: HashMap::new(),
        }
    }

    /// 添加模板变量
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.variables.insert(key.into(), value.into());
    }
}

/// 渲染后的消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMessage {
    pub subject: String,
    pub body: String,
}

/// 单渠道发送结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResult {
    pub channel: Channel,
    pub success: bool,
    pub error: Option<String>,
    /// 外部系统消息 ID（成功时）
    pub external_message_id: Option<String>,
    pub duration_ms: u64,
}

impl ChannelResult {
    pub fn success(channel: Channel, external_message_id: Option<String>, duration_ms: u64) -> Self {
        Self {
            channel,
            success: true,
            error: None,
            external_message_id,
            duration_ms,
        }
    }

    pub fn failed(channel: Channel, error: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            channel,
            success: false,
            error: Some(error.into()),
            external_message_id: None,
            duration_ms,
        }
    }
}

/// 一次通知尝试的汇总结果
///
/// 至少一个渠道成功即视为成功；只有全部失败时才带汇总错误，
/// 各渠道的具体原因保留在 channel_results 中供日志使用。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOutcome {
    pub success: bool,
    pub error: Option<String>,
    /// 因免打扰时段被推迟，未尝试任何渠道
    pub deferred: bool,
    pub channel_results: Vec<ChannelResult>,
    /// 本次发送使用的渲染结果，推迟时为空
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<RenderedMessage>,
}

impl NotificationOutcome {
    /// 免打扰推迟
    pub fn quiet_hours() -> Self {
        Self {
            success: false,
            error: Some(QUIET_HOURS_ERROR.to_string()),
            deferred: true,
            channel_results: Vec::new(),
            message: None,
        }
    }

    /// 按"任一渠道成功"规则汇总
    pub fn from_channel_results(channel_results: Vec<ChannelResult>) -> Self {
        let success = channel_results.iter().any(|r| r.success);
        Self {
            success,
            error: (!success).then(|| ALL_CHANNELS_FAILED.to_string()),
            deferred: false,
            channel_results,
            message: None,
        }
    }

    pub fn with_message(mut self, message: RenderedMessage) -> Self {
        self.message = Some(message);
        self
    }

    pub fn success_count(&self) -> usize {
        self.channel_results.iter().filter(|r| r.success).count()
    }

    pub fn failure_count(&self) -> usize {
        self.channel_results.iter().filter(|r| !r.success).count()
    }

    /// 是否部分成功
    pub fn is_partial_success(&self) -> bool {
        let success_count = self.success_count();
        success_count > 0 && success_count < self.channel_results.len()
    }

    /// 指标和日志使用的状态标签
    pub fn status_label(&self) -> &'static str {
        if self.deferred {
            "deferred"
        } else if !self.success {
            "failed"
        } else if self.is_partial_success() {
            "partial"
        } else {
            "success"
        }
    }
}
