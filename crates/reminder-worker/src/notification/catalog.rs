//! 内置默认模板目录
//!
//! 用户没有匹配模板时的最终回退：SERVICE、PAYMENT（0 级和 1 级）、APPOINTMENT、MAINTENANCE 各一份。
//! FOLLOW_UP 没有内置模板。

use std::sync::LazyLock;

use crate::models::{Channel, Priority, ReminderTemplate, ReminderType};

static DEFAULT_TEMPLATES: LazyLock<Vec<ReminderTemplate>> = LazyLock::new(|| {
    vec![
        builtin(
            "default-service-0",
            "Service reminder",
            ReminderType::Service,
            Priority::Medium,
            0,
            "Service reminder: {{product}}",
            "Dear {{customerName}},\n\n\
             This is a friendly reminder that your {{product}} is due for service on {{dueDate}}.\n\
             Recommended service interval: {{interval}} days.\n\n\
             Kind regards,\n{{companyName}}",
        ),
        builtin(
            "default-payment-0",
            "Payment reminder",
            ReminderType::Payment,
            Priority::Medium,
            0,
            "Payment reminder: {{product}}",
            "Dear {{customerName}},\n\n\
             This is a reminder that payment for {{product}} is due on {{dueDate}}.\n\n\
             Kind regards,\n{{companyName}}",
        ),
        builtin(
            "default-payment-1",
            "Payment overdue",
            ReminderType::Payment,
            Priority::High,
            1,
            "Overdue payment: {{product}}",
            "Dear {{customerName}},\n\n\
             Our records show that payment for {{product}}, due on {{dueDate}}, is still outstanding.\n\
             Please arrange payment as soon as possible or contact us if you have any questions.\n\n\
             Kind regards,\n{{companyName}}",
        ),
        builtin(
            "default-appointment-0",
            "Appointment reminder",
            ReminderType::Appointment,
            Priority::Medium,
            0,
            "Appointment reminder: {{product}}",
            "Dear {{customerName}},\n\n\
             This is a reminder of your appointment for {{product}} on {{dueDate}}.\n\n\
             Kind regards,\n{{companyName}}",
        ),
        builtin(
            "default-maintenance-0",
            "Maintenance reminder",
            ReminderType::Maintenance,
            Priority::Low,
            0,
            "Maintenance due: {{product}}",
            "Dear {{customerName}},\n\n\
             Your {{product}} is due for scheduled maintenance on {{dueDate}}.\n\n\
             Kind regards,\n{{companyName}}",
        ),
    ]
});

fn builtin(
    id: &str,
    name: &str,
    reminder_type: ReminderType,
    priority: Priority,
    escalation_level: u32,
    subject: &str,
    body: &str,
) -> ReminderTemplate {
    ReminderTemplate {
        id: id.to_string(),
        user_id: None,
        name: name.to_string(),
        reminder_type,
        channel: Channel::Email,
        subject: subject.to_string(),
        body: body.to_string(),
        priority,
        escalation_level,
        is_default: true,
    }
}

/// 全部内置模板
pub fn default_templates() -> &'static [ReminderTemplate] {
    &DEFAULT_TEMPLATES
}

/// 在内置目录中查找 (类型, 级别) 的模板
///
/// 没有精确匹配时取同类型中不高于请求级别的最高一级
pub fn find_default(reminder_type: ReminderType, escalation_level: u32) -> Option<&'static ReminderTemplate> {
    DEFAULT_TEMPLATES
        .iter()
        .filter(|t| t.reminder_type == reminder_type && t.escalation_level <= escalation_level)
        .max_by_key(|t| t.escalation_level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_five_default_templates() {
        let templates = default_templates();
        assert_eq!(templates.len(), 5);
        assert!(templates.iter().all(|t| t.is_default && t.user_id.is_none()));
    }

    #[test]
    fn test_find_default_exact_level() {
        let template = find_default(ReminderType::Payment, 1).unwrap();
        assert_eq!(template.id, "default-payment-1");

        let template = find_default(ReminderType::Payment, 0).unwrap();
        assert_eq!(template.id, "default-payment-0");
    }

    #[test]
    fn test_find_default_falls_back_to_lower_level() {
        let template = find_default(ReminderType::Payment, 3).unwrap();
        assert_eq!(template.id, "default-payment-1");

        let template = find_default(ReminderType::Service, 2).unwrap();
        assert_eq!(template.id, "default-service-0");
    }

    #[test]
    fn test_follow_up_has_no_default() {
        assert!(find_default(ReminderType::FollowUp, 0).is_none());
    }
}
