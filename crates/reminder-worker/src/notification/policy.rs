//! 通知策略
//!
//! 纯决策逻辑，不产生任何副作用：
//! - 按优先级选择要尝试的渠道
//! - 判断当前是否处于免打扰时段
//! - 判断提醒是否需要升级，以及升级后的优先级
//!
//! 渠道选择不考虑各渠道的开关设置，开关由各渠道发送器自行判断。

use chrono::{DateTime, Utc};

use crate::models::{Channel, NotificationSettings, Priority, Reminder};

/// 按优先级返回要尝试的渠道
///
/// 顺序表示触达范围递增，不代表发送先后（引擎并发发送）
pub fn channels_for(priority: Priority) -> &'static [Channel] {
    match priority {
        Priority::Low => &[Channel::Email],
        Priority::Medium => &[Channel::Email, Channel::Push],
        Priority::High => &[Channel::Email, Channel::Sms, Channel::Push],
        Priority::Urgent => &[Channel::Email, Channel::Sms, Channel::Push, Channel::Call],
    }
}

/// 判断 `now` 是否处于免打扰时段
///
/// 起止任一未设置时永不免打扰。否则把 `now` 换算为设置时区下的 "HH:MM"，
/// 按字符串比较 `start <= now <= end`。
///
/// 跨午夜的区间（如 22:00-06:00）按此比较永远不会命中，这是有意保留的既有行为。
pub fn is_quiet_hours(now: DateTime<Utc>, settings: &NotificationSettings) -> bool {
    let Some((start, end)) = settings.quiet_hours() else {
        return false;
    };

    let local = now.with_timezone(&settings.tz()).format("%H:%M").to_string();
    start <= local.as_str() && local.as_str() <= end
}

/// 判断提醒是否应当升级
///
/// - 全局关闭升级、提醒未开启自动升级、或已到最高级别：不升级
/// - 从未发送过：升级
/// - 否则距上次发送满 `auto_escalate_days` 天才升级
pub fn should_escalate(
    reminder: &Reminder,
    settings: &NotificationSettings,
    now: DateTime<Utc>,
) -> bool {
    if !settings.escalation_enabled || !reminder.auto_escalate || !reminder.can_escalate() {
        return false;
    }

    match reminder.days_since_last_sent(now) {
        None => true,
        Some(days) => days >= i64::from(settings.auto_escalate_days),
    }
}

/// 升级后的优先级，URGENT 封顶
pub fn escalate(priority: Priority) -> Priority {
    priority.escalate()
}
