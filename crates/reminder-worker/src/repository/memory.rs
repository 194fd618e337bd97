//! 内存存储
//!
//! 使用 DashMap 实现的并发内存存储，适用于测试和开发环境。
//! 沟通记录与提醒状态通过同一把写锁一起落盘，读取不持锁。

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, info};

use super::traits::{
    CommunicationRepository, CustomerRepository, ReminderRepository, SettingsRepository,
    TemplateRepository,
};
use crate::error::{ReminderError, Result};
use crate::models::{
    Communication, Customer, NotificationSettings, Reminder, ReminderTemplate, ReminderType,
};
use crate::notification::catalog;

/// 内存存储
///
/// Clone 共享同一份数据
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    reminders: Arc<DashMap<String, Reminder>>,
    customers: Arc<DashMap<String, Customer>>,
    settings: Arc<DashMap<String, NotificationSettings>>,
    templates: Arc<DashMap<String, ReminderTemplate>>,
    communications: Arc<DashMap<String, Vec<Communication>>>,
    write_lock: Arc<Mutex<()>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入或覆盖客户
    pub fn insert_customer(&self, customer: Customer) {
        self.customers.insert(customer.id.clone(), customer);
    }

    /// 插入或覆盖提醒
    pub fn insert_reminder(&self, reminder: Reminder) {
        self.reminders.insert(reminder.id.clone(), reminder);
    }

    /// 沟通记录总数
    pub fn communication_count(&self) -> usize {
        self.communications.iter().map(|entry| entry.value().len()).sum()
    }
}

#[async_trait]
impl ReminderRepository for MemoryStore {
    async fn get_reminder(&self, id: &str) -> Result<Option<Reminder>> {
        Ok(self.reminders.get(id).map(|r| r.clone()))
    }

    async fn list_active_by_user(&self, user_id: &str) -> Result<Vec<Reminder>> {
        let mut reminders: Vec<Reminder> = self
            .reminders
            .iter()
            .filter(|entry| entry.user_id == user_id && entry.active)
            .map(|entry| entry.value().clone())
            .collect();
        reminders.sort_by(|a, b| a.next_due.cmp(&b.next_due).then_with(|| a.id.cmp(&b.id)));
        Ok(reminders)
    }

    async fn list_user_ids(&self) -> Result<Vec<String>> {
        let mut user_ids: Vec<String> = self
            .reminders
            .iter()
            .map(|entry| entry.user_id.clone())
            .collect();
        user_ids.sort();
        user_ids.dedup();
        Ok(user_ids)
    }

    async fn save_reminder(&self, reminder: &Reminder) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.reminders.insert(reminder.id.clone(), reminder.clone());
        Ok(())
    }
}

#[async_trait]
impl CustomerRepository for MemoryStore {
    async fn get_customer(&self, id: &str) -> Result<Option<Customer>> {
        Ok(self.customers.get(id).map(|c| c.clone()))
    }
}

#[async_trait]
impl SettingsRepository for MemoryStore {
    async fn get_or_create(&self, user_id: &str) -> Result<NotificationSettings> {
        let settings = self
            .settings
            .entry(user_id.to_string())
            .or_insert_with(|| {
                info!(user_id = %user_id, "首次访问，创建默认通知设置");
                NotificationSettings::default_for(user_id)
            })
            .clone();
        Ok(settings)
    }

    async fn save_settings(&self, settings: &NotificationSettings) -> Result<NotificationSettings> {
        settings.validate_all()?;
        self.settings
            .insert(settings.user_id.clone(), settings.clone());
        debug!(user_id = %settings.user_id, "通知设置已保存");
        Ok(settings.clone())
    }
}

#[async_trait]
impl TemplateRepository for MemoryStore {
    async fn get_template(&self, id: &str) -> Result<Option<ReminderTemplate>> {
        if let Some(template) = self.templates.get(id) {
            return Ok(Some(template.clone()));
        }
        Ok(catalog::default_templates()
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn find_user_template(
        &self,
        user_id: &str,
        reminder_type: ReminderType,
        escalation_level: u32,
    ) -> Result<Option<ReminderTemplate>> {
        Ok(self
            .templates
            .iter()
            .find(|entry| {
                entry.user_id.as_deref() == Some(user_id)
                    && entry.matches(reminder_type, escalation_level)
            })
            .map(|entry| entry.value().clone()))
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<ReminderTemplate>> {
        let mut own: Vec<ReminderTemplate> = self
            .templates
            .iter()
            .filter(|entry| entry.user_id.as_deref() == Some(user_id))
            .map(|entry| entry.value().clone())
            .collect();
        own.sort_by(|a, b| a.id.cmp(&b.id));

        let mut templates = catalog::default_templates().to_vec();
        templates.extend(own);
        Ok(templates)
    }

    async fn save_template(&self, template: &ReminderTemplate) -> Result<()> {
        if template.is_default || is_builtin(&template.id) {
            return Err(ReminderError::DefaultTemplateImmutable(template.id.clone()));
        }
        if template.user_id.is_none() {
            return Err(ReminderError::Repository(format!(
                "用户模板必须指定所属用户: {}",
                template.id
            )));
        }
        self.templates.insert(template.id.clone(), template.clone());
        Ok(())
    }

    async fn delete_template(&self, user_id: &str, id: &str) -> Result<()> {
        if is_builtin(id) {
            return Err(ReminderError::DefaultTemplateImmutable(id.to_string()));
        }
        match self
            .templates
            .remove_if(id, |_, t| t.user_id.as_deref() == Some(user_id))
        {
            Some(_) => Ok(()),
            None => Err(ReminderError::Repository(format!("模板不存在: {id}"))),
        }
    }
}

fn is_builtin(id: &str) -> bool {
    catalog::default_templates().iter().any(|t| t.id == id)
}

#[async_trait]
impl CommunicationRepository for MemoryStore {
    async fn record_attempt(&self, communication: &Communication, reminder: &Reminder) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.communications
            .entry(communication.reminder_id.clone())
            .or_default()
            .push(communication.clone());
        self.reminders.insert(reminder.id.clone(), reminder.clone());
        Ok(())
    }

    async fn list_by_reminder(&self, reminder_id: &str) -> Result<Vec<Communication>> {
        let mut communications = self
            .communications
            .get(reminder_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        communications.sort_by_key(|c| c.created_at);
        Ok(communications)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::{Channel, CommunicationStatus, Priority};

    fn make_reminder(id: &str, user_id: &str) -> Reminder {
        Reminder {
            id: id.to_string(),
            user_id: user_id.to_string(),
            customer_id: "cust-1".to_string(),
            product: "Boiler service".to_string(),
            reminder_type: ReminderType::Service,
            priority: Priority::Medium,
            escalation_level: 0,
            max_escalation_level: 3,
            auto_escalate: true,
            interval_days: Some(365),
            template_id: None,
            last_sent: None,
            next_due: Utc::now(),
            active: true,
        }
    }

    fn make_user_template(id: &str, user_id: &str) -> ReminderTemplate {
        ReminderTemplate {
            id: id.to_string(),
            user_id: Some(user_id.to_string()),
            name: "Custom".to_string(),
            reminder_type: ReminderType::Service,
            channel: Channel::Email,
            subject: "Custom {{product}}".to_string(),
            body: "Hi {{customerName}}".to_string(),
            priority: Priority::Medium,
            escalation_level: 0,
            is_default: false,
        }
    }

    #[tokio::test]
    async fn test_settings_created_with_defaults_once() {
        let store = MemoryStore::new();

        let first = store.get_or_create("user-1").await.unwrap();
        assert_eq!(first, NotificationSettings::default_for("user-1"));

        let mut changed = first.clone();
        changed.sms_enabled = true;
        store.save_settings(&changed).await.unwrap();

        let again = store.get_or_create("user-1").await.unwrap();
        assert!(again.sms_enabled);
    }

    #[tokio::test]
    async fn test_save_settings_rejects_invalid() {
        let store = MemoryStore::new();
        let mut settings = NotificationSettings::default_for("user-1");
        settings.auto_escalate_days = 0;

        let result = store.save_settings(&settings).await;
        assert!(matches!(result, Err(ReminderError::InvalidSettings(_))));
    }

    #[tokio::test]
    async fn test_list_active_by_user_filters() {
        let store = MemoryStore::new();
        store.insert_reminder(make_reminder("rem-1", "user-1"));
        store.insert_reminder(make_reminder("rem-2", "user-2"));
        let mut inactive = make_reminder("rem-3", "user-1");
        inactive.active = false;
        store.insert_reminder(inactive);

        let reminders = store.list_active_by_user("user-1").await.unwrap();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].id, "rem-1");

        let user_ids = store.list_user_ids().await.unwrap();
        assert_eq!(user_ids, vec!["user-1".to_string(), "user-2".to_string()]);
    }

    #[tokio::test]
    async fn test_default_templates_are_immutable() {
        let store = MemoryStore::new();

        let builtin = store.get_template("default-service-0").await.unwrap().unwrap();
        assert!(builtin.is_default);

        let result = store.save_template(&builtin).await;
        assert!(matches!(result, Err(ReminderError::DefaultTemplateImmutable(_))));

        let result = store.delete_template("user-1", "default-service-0").await;
        assert!(matches!(result, Err(ReminderError::DefaultTemplateImmutable(_))));
    }

    #[tokio::test]
    async fn test_user_templates_scoped_by_owner() {
        let store = MemoryStore::new();
        store
            .save_template(&make_user_template("tpl-1", "user-1"))
            .await
            .unwrap();

        let found = store
            .find_user_template("user-1", ReminderType::Service, 0)
            .await
            .unwrap();
        assert_eq!(found.map(|t| t.id), Some("tpl-1".to_string()));

        let other = store
            .find_user_template("user-2", ReminderType::Service, 0)
            .await
            .unwrap();
        assert!(other.is_none());

        let listed = store.list_for_user("user-1").await.unwrap();
        assert_eq!(listed.len(), catalog::default_templates().len() + 1);
        assert_eq!(listed.last().map(|t| t.id.as_str()), Some("tpl-1"));

        assert!(store.delete_template("user-2", "tpl-1").await.is_err());
        store.delete_template("user-1", "tpl-1").await.unwrap();
        assert!(store.get_template("tpl-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_record_attempt_writes_both() {
        let store = MemoryStore::new();
        let mut reminder = make_reminder("rem-1", "user-1");
        store.insert_reminder(reminder.clone());

        let now = Utc::now();
        reminder.last_sent = Some(now);
        let comm = Communication::new("rem-1", "cust-1", Channel::Email, "ada@example.com", now)
            .mark_sent(now);
        store.record_attempt(&comm, &reminder).await.unwrap();

        let stored = store.get_reminder("rem-1").await.unwrap().unwrap();
        assert_eq!(stored.last_sent, Some(now));

        let comms = store.list_by_reminder("rem-1").await.unwrap();
        assert_eq!(comms.len(), 1);
        assert_eq!(comms[0].status, CommunicationStatus::Sent);
        assert_eq!(store.communication_count(), 1);
    }
}
