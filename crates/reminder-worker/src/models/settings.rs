//! 通知设置
//!
//! 每个用户（租户）一份，首次访问时按默认值创建，保存时整体覆盖（upsert），不做物理删除。

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;
use validator::Validate;

use crate::error::{ReminderError, Result};

/// 通知设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub user_id: String,
    pub email_enabled: bool,
    pub sms_enabled: bool,
    pub push_enabled: bool,
    /// 到期前提前多少天开始提醒
    #[validate(range(min = 1, max = 30, message = "提前提醒天数必须在1-30之间"))]
    pub reminder_advance_days: u32,
    /// 关闭后任何升级判定都返回"不升级"
    pub escalation_enabled: bool,
    /// 距上次发送超过多少天自动升级
    #[validate(range(min = 1, max = 30, message = "自动升级天数必须在1-30之间"))]
    pub auto_escalate_days: u32,
    /// 免打扰开始时间（HH:MM）
    pub quiet_hours_start: Option<String>,
    /// 免打扰结束时间（HH:MM）
    pub quiet_hours_end: Option<String>,
    /// IANA 时区名，如 Europe/Berlin
    pub timezone: String,
}

impl NotificationSettings {
    /// 按默认值创建某个用户的设置
    pub fn default_for(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email_enabled: true,
            sms_enabled: false,
            push_enabled: true,
            reminder_advance_days: 7,
            escalation_enabled: true,
            auto_escalate_days: 3,
            quiet_hours_start: None,
            quiet_hours_end: None,
            timezone: "UTC".to_string(),
        }
    }

    /// 完整校验：字段范围 + 免打扰时间格式 + 时区
    pub fn validate_all(&self) -> Result<()> {
        self.validate()?;

        for (field, value) in [
            ("quiet_hours_start", &self.quiet_hours_start),
            ("quiet_hours_end", &self.quiet_hours_end),
        ] {
            match value {
                Some(value) if !is_time_of_day(value) => {
                    return Err(ReminderError::InvalidSettings(format!(
                        "{field} 必须是 HH:MM 格式: {value}"
                    )));
                }
                _ => {}
            }
        }

        if self.timezone.parse::<Tz>().is_err() {
            return Err(ReminderError::InvalidSettings(format!(
                "未知时区: {}",
                self.timezone
            )));
        }

        Ok(())
    }

    /// 解析时区，无效时回退到 UTC
    pub fn tz(&self) -> Tz {
        self.timezone.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                user_id = %self.user_id,
                timezone = %self.timezone,
                "时区无效，回退到 UTC"
            );
            Tz::UTC
        })
    }

    /// 免打扰区间，起止任一未设置时返回 None
    pub fn quiet_hours(&self) -> Option<(&str, &str)> {
        match (&self.quiet_hours_start, &self.quiet_hours_end) {
            (Some(start), Some(end)) => Some((start.as_str(), end.as_str())),
            _ => None,
        }
    }
}

/// 校验 HH:MM（00-23 / 00-59）
fn is_time_of_day(value: &str) -> bool {
    let Some((hours, minutes)) = value.split_once(':') else {
        return false;
    };
    if hours.len() != 2 || minutes.len() != 2 {
        return false;
    }
    matches!(
        (hours.parse::<u8>(), minutes.parse::<u8>()),
        (Ok(h), Ok(m)) if h < 24 && m < 60
    )
}
