//! 多渠道通知模块
//!
//! 根据提醒优先级选择渠道，并发投递，汇总为一次通知结果。
//!
//! ## 架构
//!
//! ```text
//! ReminderProcessor
//!        │
//!        ▼
//! NotificationEngine ──► policy（免打扰 / 渠道表 / 升级判定）
//!        │
//!        ├──► TemplateRenderer
//!        │
//!        └──► ChannelRegistry
//!                 ├── EmailChannel ──► Mailer (SMTP)
//!                 ├── SmsChannel   ─┐
//!                 ├── PushChannel  ─┼─► DeliveryGateway
//!                 └── CallChannel  ─┘
//! ```

pub mod catalog;
pub mod channels;
pub mod engine;
pub mod mailer;
pub mod policy;
pub mod template;
pub mod types;

pub use channels::{ChannelRegistry, ChannelSender, DeliveryGateway, LoggingGateway};
pub use engine::NotificationEngine;
pub use mailer::{EmailMessage, Mailer, SmtpMailer};
pub use template::TemplateRenderer;
pub use types::{
    ChannelResult, NotificationContext, NotificationOutcome, RenderedMessage, ReminderSnapshot,
    TemplateSnapshot,
};
