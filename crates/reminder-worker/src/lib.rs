//! 提醒升级与多渠道通知服务
//!
//! 扫描到期或需要升级的提醒，按优先级通过邮件、短信、推送、语音呼叫触达客户。
//!
//! ## 核心功能
//!
//! - **模板渲染**：`{{name}}` 占位符替换，缺失变量渲染为空
//! - **通知策略**：优先级到渠道的映射、免打扰时段、升级判定
//! - **通知引擎**：多渠道并发发送，任一渠道成功即成功
//! - **提醒处理**：到期判定、模板解析、沟通记录与提醒状态的原子写回
//! - **周期扫描**：按固定间隔处理所有用户的提醒
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `notification`: 通知引擎、策略、模板与渠道
//! - `repository`: 仓储接口与内存实现
//! - `processor`: 提醒处理器
//! - `worker`: 周期扫描 Worker

pub mod error;
pub mod models;
pub mod notification;
pub mod processor;
pub mod repository;
pub mod worker;

pub use error::{ReminderError, Result};
pub use models::*;
pub use notification::{
    ChannelRegistry, ChannelResult, ChannelSender, NotificationContext, NotificationEngine,
    NotificationOutcome, SmtpMailer, TemplateRenderer,
};
pub use processor::{ProcessOutcome, ProcessingSummary, ReminderProcessor, should_process};
pub use repository::{MemoryStore, Repositories};
pub use worker::ReminderWorker;
