//! 仓储 Trait 定义
//!
//! 处理器只依赖这些接口，具体存储可替换，测试中使用 mock

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Communication, Customer, NotificationSettings, Reminder, ReminderTemplate, ReminderType,
};

/// 提醒仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReminderRepository: Send + Sync {
    async fn get_reminder(&self, id: &str) -> Result<Option<Reminder>>;
    /// 某个用户的全部启用中的提醒
    async fn list_active_by_user(&self, user_id: &str) -> Result<Vec<Reminder>>;
    /// 拥有提醒的全部用户
    async fn list_user_ids(&self) -> Result<Vec<String>>;
    async fn save_reminder(&self, reminder: &Reminder) -> Result<()>;
}

/// 客户仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn get_customer(&self, id: &str) -> Result<Option<Customer>>;
}

/// 通知设置仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// 读取设置，不存在时按默认值创建并返回
    async fn get_or_create(&self, user_id: &str) -> Result<NotificationSettings>;
    /// 校验后整体覆盖保存
    async fn save_settings(&self, settings: &NotificationSettings) -> Result<NotificationSettings>;
}

/// 模板仓储接口
///
/// 内置默认模板对所有用户可见，但不可修改或删除
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// 按 ID 查找，先查用户模板再查内置模板
    async fn get_template(&self, id: &str) -> Result<Option<ReminderTemplate>>;
    /// 用户自己的 (类型, 级别) 模板
    async fn find_user_template(
        &self,
        user_id: &str,
        reminder_type: ReminderType,
        escalation_level: u32,
    ) -> Result<Option<ReminderTemplate>>;
    /// 用户可见的全部模板：内置模板在前，用户模板在后
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<ReminderTemplate>>;
    async fn save_template(&self, template: &ReminderTemplate) -> Result<()>;
    async fn delete_template(&self, user_id: &str, id: &str) -> Result<()>;
}

/// 沟通记录仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommunicationRepository: Send + Sync {
    /// 原子地写入一条沟通记录并保存提醒的最新状态
    async fn record_attempt(&self, communication: &Communication, reminder: &Reminder)
    -> Result<()>;
    /// 按创建时间升序
    async fn list_by_reminder(&self, reminder_id: &str) -> Result<Vec<Communication>>;
}
