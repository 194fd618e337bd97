//! 提醒服务枚举类型定义
//!
//! 所有枚举都以 SCREAMING_SNAKE_CASE 进行 JSON 序列化，与存储层字段取值保持一致

use std::fmt;

use serde::{Deserialize, Serialize};

/// 提醒优先级
///
/// 声明顺序即触达范围的递增顺序，派生的 `Ord` 依赖这一点
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// 升级一级，URGENT 封顶
    pub fn escalate(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High | Self::Urgent => Self::Urgent,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Urgent => "URGENT",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 通知投递渠道
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    Email,
    Sms,
    Push,
    Call,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Self::Email, Self::Sms, Self::Push, Self::Call];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::Sms => "SMS",
            Self::Push => "PUSH",
            Self::Call => "CALL",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 提醒类型
///
/// 决定默认模板的选择
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderType {
    /// 服务到期提醒
    #[default]
    Service,
    /// 付款提醒
    Payment,
    /// 跟进
    FollowUp,
    /// 预约
    Appointment,
    /// 维护保养
    Maintenance,
}

impl ReminderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "SERVICE",
            Self::Payment => "PAYMENT",
            Self::FollowUp => "FOLLOW_UP",
            Self::Appointment => "APPOINTMENT",
            Self::Maintenance => "MAINTENANCE",
        }
    }
}

impl fmt::Display for ReminderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 沟通记录状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommunicationStatus {
    /// 待发送（如被免打扰时段推迟）
    #[default]
    Pending,
    Sent,
    Delivered,
    Failed,
    Bounced,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_escalate_saturates() {
        assert_eq!(Priority::Low.escalate(), Priority::Medium);
        assert_eq!(Priority::Medium.escalate(), Priority::High);
        assert_eq!(Priority::High.escalate(), Priority::Urgent);
        assert_eq!(Priority::Urgent.escalate(), Priority::Urgent);

        let top = Priority::Low.escalate().escalate().escalate().escalate();
        assert_eq!(top, Priority::Urgent);
        assert_eq!(top.escalate(), Priority::Urgent);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::High < Priority::Urgent);
    }

    #[test]
    fn test_enum_serialization() {
        assert_eq!(
            serde_json::to_string(&ReminderType::FollowUp).unwrap(),
            "\"FOLLOW_UP\""
        );
        assert_eq!(serde_json::to_string(&Channel::Sms).unwrap(), "\"SMS\"");

        let priority: Priority = serde_json::from_str("\"URGENT\"").unwrap();
        assert_eq!(priority, Priority::Urgent);
    }

    #[test]
    fn test_display_matches_serde() {
        for channel in Channel::ALL {
            let json = serde_json::to_string(&channel).unwrap();
            assert_eq!(json, format!("\"{channel}\""));
        }
    }
}
