//! 邮件投递
//!
//! `Mailer` 抽象邮件投递行为，由组合根显式构建并注入邮件渠道，不使用全局单例。
//! `SmtpMailer` 基于 lettre 异步 SMTP 传输；未配置 SMTP 主机时以 no-op 模式运行，仅记录日志。

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use reminder_shared::config::SmtpConfig;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ReminderError, Result};

/// 待投递的邮件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

impl EmailMessage {
    /// 由纯文本正文构建，HTML 版本把换行替换为 `<br>`
    pub fn from_text(to: impl Into<String>, subject: impl Into<String>, text: &str) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html_body: text.replace('\n', "<br>"),
            text_body: text.to_string(),
        }
    }
}

/// 邮件投递接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// 投递邮件，成功时返回消息标识
    async fn deliver(&self, message: EmailMessage) -> Result<String>;
}

/// SMTP 邮件投递
#[derive(Clone)]
pub struct SmtpMailer {
    transport: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
    from: Mailbox,
}

impl SmtpMailer {
    /// 根据配置构建
    ///
    /// host 为空时进入 no-op 模式，便于开发和测试环境运行
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let from = config
            .mailbox()
            .parse::<Mailbox>()
            .map_err(|e| ReminderError::MailTransport(format!("发件人地址无效: {e}")))?;

        let transport = if !config.is_configured() {
            warn!("未配置 SMTP 主机，邮件发送器以 no-op 模式运行");
            None
        } else {
            let builder = if config.secure {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            }
            .map_err(|e| ReminderError::MailTransport(format!("SMTP 传输配置失败: {e}")))?
            .port(config.port);

            let builder = match (&config.username, &config.password) {
                (Some(username), Some(password)) => {
                    builder.credentials(Credentials::new(username.clone(), password.clone()))
                }
                _ => builder,
            };

            Some(Arc::new(builder.build()))
        };

        Ok(Self { transport, from })
    }

    /// 是否连接了真实 SMTP 服务器
    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn deliver(&self, message: EmailMessage) -> Result<String> {
        let message_id = format!("email_{}", Uuid::now_v7());

        let Some(transport) = &self.transport else {
            info!(
                to = %message.to,
                subject = %message.subject,
                message_id = %message_id,
                "邮件服务处于 no-op 模式，跳过实际发送"
            );
            return Ok(message_id);
        };

        let to = message
            .to
            .parse::<Mailbox>()
            .map_err(|e| ReminderError::MailTransport(format!("收件人地址无效: {e}")))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                message.text_body,
                message.html_body,
            ))
            .map_err(|e| ReminderError::MailTransport(format!("构建邮件失败: {e}")))?;

        transport
            .send(email)
            .await
            .map_err(|e| ReminderError::MailTransport(format!("SMTP 发送失败: {e}")))?;

        debug!(to = %message.to, message_id = %message_id, "邮件已被 SMTP 服务器接受");
        Ok(message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_converts_newlines() {
        let message = EmailMessage::from_text("ada@example.com", "Reminder", "Line 1\nLine 2");
        assert_eq!(message.html_body, "Line 1<br>Line 2");
        assert_eq!(message.text_body, "Line 1\nLine 2");
    }

    #[test]
    fn test_noop_mode_when_host_empty() {
        let mailer = SmtpMailer::new(&SmtpConfig::default()).expect("构建 no-op 邮件发送器失败");
        assert!(!mailer.is_enabled());
    }

    #[test]
    fn test_invalid_from_address_rejected() {
        let config = SmtpConfig {
            from_address: "not an address".to_string(),
            from_name: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            SmtpMailer::new(&config),
            Err(ReminderError::MailTransport(_))
        ));
    }

    #[tokio::test]
    async fn test_noop_deliver_succeeds() {
        let mailer = SmtpMailer::new(&SmtpConfig::default()).unwrap();
        let message_id = mailer
            .deliver(EmailMessage::from_text("ada@example.com", "Hi", "Body"))
            .await
            .unwrap();
        assert!(message_id.starts_with("email_"));
    }
}
