//! 提醒服务错误类型
//!
//! 覆盖提醒处理、模板解析、设置校验与渠道投递等场景。
//! 渠道层错误在引擎内会被转换为失败的渠道结果，不会跨渠道传播。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReminderError {
    // === 数据相关错误 ===
    #[error("提醒不存在: {0}")]
    ReminderNotFound(String),

    #[error("客户不存在: {0}")]
    CustomerNotFound(String),

    #[error("提醒模板未找到: type={reminder_type}, escalation_level={escalation_level}")]
    TemplateNotFound {
        reminder_type: String,
        escalation_level: u32,
    },

    #[error("默认模板不可修改或删除: {0}")]
    DefaultTemplateImmutable(String),

    // === 设置校验错误 ===
    #[error("通知设置无效: {0}")]
    InvalidSettings(String),

    // === 投递相关错误 ===
    #[error("邮件投递失败: {0}")]
    MailTransport(String),

    #[error("渠道投递失败: 渠道={channel}, 原因={reason}")]
    Delivery { channel: String, reason: String },

    // === 存储相关错误 ===
    #[error("存储错误: {0}")]
    Repository(String),
}

impl From<validator::ValidationErrors> for ReminderError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::InvalidSettings(err.to_string())
    }
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, ReminderError>;

impl ReminderError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::ReminderNotFound(_) => "REMINDER_NOT_FOUND",
            Self::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            Self::TemplateNotFound { .. } => "TEMPLATE_NOT_FOUND",
            Self::DefaultTemplateImmutable(_) => "DEFAULT_TEMPLATE_IMMUTABLE",
            Self::InvalidSettings(_) => "INVALID_SETTINGS",
            Self::MailTransport(_) => "MAIL_TRANSPORT_ERROR",
            Self::Delivery { .. } => "DELIVERY_ERROR",
            Self::Repository(_) => "REPOSITORY_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReminderError::Delivery {
            channel: "SMS".to_string(),
            reason: "网关超时".to_string(),
        };
        assert_eq!(err.to_string(), "渠道投递失败: 渠道=SMS, 原因=网关超时");

        let err = ReminderError::TemplateNotFound {
            reminder_type: "FOLLOW_UP".to_string(),
            escalation_level: 2,
        };
        assert_eq!(
            err.to_string(),
            "提醒模板未找到: type=FOLLOW_UP, escalation_level=2"
        );
    }

    #[test]
    fn test_error_code() {
        assert_eq!(
            ReminderError::CustomerNotFound("c-1".to_string()).code(),
            "CUSTOMER_NOT_FOUND"
        );
        assert_eq!(
            ReminderError::DefaultTemplateImmutable("default-service-0".to_string()).code(),
            "DEFAULT_TEMPLATE_IMMUTABLE"
        );
    }
}
