//! 提醒模板模型

use serde::{Deserialize, Serialize};

use super::enums::{Channel, Priority, ReminderType};

/// 提醒模板
///
/// subject / body 中可使用 `{{name}}` 占位符。
/// is_default 为 true 的是系统内置模板，用户不可编辑或删除。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderTemplate {
    pub id: String,
    /// 所属用户，系统模板为 None
    pub user_id: Option<String>,
    pub name: String,
    pub reminder_type: ReminderType,
    /// 记录到沟通记录中的主渠道
    pub channel: Channel,
    pub subject: String,
    pub body: String,
    pub priority: Priority,
    /// 该模板适用的升级级别
    pub escalation_level: u32,
    pub is_default: bool,
}

impl ReminderTemplate {
    /// 是否适用于 (类型, 升级级别)
    pub fn matches(&self, reminder_type: ReminderType, escalation_level: u32) -> bool {
        self.reminder_type == reminder_type && self.escalation_level == escalation_level
    }
}
