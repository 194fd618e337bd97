//! 提醒与客户模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{Priority, ReminderType};

/// 客户快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Customer {
    /// 手机号存在且非空白
    pub fn has_phone(&self) -> bool {
        self.phone.as_deref().is_some_and(|p| !p.trim().is_empty())
    }

    pub fn has_email(&self) -> bool {
        self.email.as_deref().is_some_and(|e| !e.trim().is_empty())
    }
}

/// 提醒
///
/// escalation_level 始终不超过 max_escalation_level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    /// 所属用户（租户），决定使用哪份通知设置
    pub user_id: String,
    pub customer_id: String,
    /// 产品或服务名称
    pub product: String,
    pub reminder_type: ReminderType,
    pub priority: Priority,
    pub escalation_level: u32,
    pub max_escalation_level: u32,
    pub auto_escalate: bool,
    /// 服务周期（天），仅用于模板变量 interval
    pub interval_days: Option<u32>,
    /// 显式指定的模板，为空时按 (类型, 升级级别) 取默认模板
    pub template_id: Option<String>,
    pub last_sent: Option<DateTime<Utc>>,
    pub next_due: DateTime<Utc>,
    pub active: bool,
}

impl Reminder {
    /// 距上次发送的整天数，从未发送时返回 None
    pub fn days_since_last_sent(&self, now: DateTime<Utc>) -> Option<i64> {
        self.last_sent.map(|sent| (now - sent).num_days())
    }

    pub fn can_escalate(&self) -> bool {
        self.escalation_level < self.max_escalation_level
    }

    /// 升级一级：级别 +1（上限 max_escalation_level），仅在级别确实提升时提高优先级
    ///
    /// 返回是否发生了升级
    pub fn apply_escalation(&mut self) -> bool {
        if !self.can_escalate() {
            return false;
        }
        self.escalation_level += 1;
        self.priority = self.priority.escalate();
        true
    }
}
