//! 提醒处理器
//!
//! 决定哪些提醒需要处理，解析模板、组装上下文并调用通知引擎，
//! 然后把沟通记录和提醒的新状态一次性写回存储。
//!
//! ## 处理规则
//!
//! - 免打扰推迟：记录一条 PENDING 沟通记录（最近一条已是 PENDING 时不重复记录），不更新 last_sent
//! - 其余情况：无论成败都更新 last_sent
//! - 仅在发送成功且发送前判定需要升级时，升级级别并提高优先级
//! - 单个提醒出错只计入失败，不中断同批次的其他提醒

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use reminder_shared::observability::metrics;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{ReminderError, Result};
use crate::models::{
    Channel, Communication, CommunicationStatus, Customer, NotificationSettings, Reminder,
    ReminderTemplate,
};
use crate::notification::types::{ALL_CHANNELS_FAILED, QUIET_HOURS_ERROR};
use crate::notification::{
    NotificationContext, NotificationEngine, ReminderSnapshot, TemplateSnapshot, catalog, policy,
};
use crate::repository::Repositories;

/// 单个提醒的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessOutcome {
    /// 至少一个渠道发送成功
    Sent,
    /// 全部渠道失败或无法发送
    Failed,
    /// 处于免打扰时段
    Deferred,
    /// 未到处理条件
    Skipped,
}

impl ProcessOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Deferred => "deferred",
            Self::Skipped => "skipped",
        }
    }
}

/// 一个批次的处理汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingSummary {
    pub examined: usize,
    pub sent: usize,
    pub failed: usize,
    pub deferred: usize,
    pub skipped: usize,
}

impl ProcessingSummary {
    fn record(&mut self, outcome: ProcessOutcome) {
        match outcome {
            ProcessOutcome::Sent => self.sent += 1,
            ProcessOutcome::Failed => self.failed += 1,
            ProcessOutcome::Deferred => self.deferred += 1,
            ProcessOutcome::Skipped => self.skipped += 1,
        }
    }

    /// 合并另一个批次
    pub fn merge(&mut self, other: ProcessingSummary) {
        self.examined += other.examined;
        self.sent += other.sent;
        self.failed += other.failed;
        self.deferred += other.deferred;
        self.skipped += other.skipped;
    }
}

/// 判断提醒是否需要处理
///
/// 需同时满足：
/// - 提醒处于启用状态
/// - 已进入提前提醒窗口（`now >= next_due - reminder_advance_days`），或需要升级
/// - 从未发送过，或距上次发送至少一天
pub fn should_process(
    reminder: &Reminder,
    settings: &NotificationSettings,
    now: DateTime<Utc>,
) -> bool {
    if !reminder.active {
        return false;
    }

    let window_start = reminder.next_due - Duration::days(i64::from(settings.reminder_advance_days));
    let due = now >= window_start;
    if !due && !policy::should_escalate(reminder, settings, now) {
        return false;
    }

    reminder
        .days_since_last_sent(now)
        .is_none_or(|days| days >= 1)
}

/// 提醒处理器
pub struct ReminderProcessor {
    repos: Repositories,
    engine: Arc<NotificationEngine>,
    company_name: String,
}

impl ReminderProcessor {
    pub fn new(
        repos: Repositories,
        engine: Arc<NotificationEngine>,
        company_name: impl Into<String>,
    ) -> Self {
        Self {
            repos,
            engine,
            company_name: company_name.into(),
        }
    }

    /// 处理某个用户的全部启用中的提醒
    ///
    /// 按顺序逐个处理；只有读取提醒列表本身失败时才返回错误
    #[instrument(skip(self, now))]
    pub async fn process_due(&self, user_id: &str, now: DateTime<Utc>) -> Result<ProcessingSummary> {
        let settings = self.repos.settings.get_or_create(user_id).await?;
        let reminders = self.repos.reminders.list_active_by_user(user_id).await?;

        let mut summary = ProcessingSummary::default();
        for reminder in &reminders {
            summary.examined += 1;

            let outcome = match self.process_with_settings(reminder, &settings, now).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(
                        reminder_id = %reminder.id,
                        error = %e,
                        code = e.code(),
                        "提醒处理失败"
                    );
                    metrics::record_reminder_processed(ProcessOutcome::Failed.as_str());
                    ProcessOutcome::Failed
                }
            };
            summary.record(outcome);
        }

        info!(
            examined = summary.examined,
            sent = summary.sent,
            failed = summary.failed,
            deferred = summary.deferred,
            skipped = summary.skipped,
            "批次处理完成"
        );
        Ok(summary)
    }

    /// 按 ID 处理单个提醒
    pub async fn process_by_id(&self, reminder_id: &str, now: DateTime<Utc>) -> Result<ProcessOutcome> {
        let reminder = self
            .repos
            .reminders
            .get_reminder(reminder_id)
            .await?
            .ok_or_else(|| ReminderError::ReminderNotFound(reminder_id.to_string()))?;
        self.process_reminder(&reminder, now).await
    }

    /// 处理单个提醒
    pub async fn process_reminder(&self, reminder: &Reminder, now: DateTime<Utc>) -> Result<ProcessOutcome> {
        let settings = self.repos.settings.get_or_create(&reminder.user_id).await?;
        self.process_with_settings(reminder, &settings, now).await
    }

    #[instrument(
        skip(self, reminder, settings),
        fields(reminder_id = %reminder.id, escalation_level = reminder.escalation_level)
    )]
    async fn process_with_settings(
        &self,
        reminder: &Reminder,
        settings: &NotificationSettings,
        now: DateTime<Utc>,
    ) -> Result<ProcessOutcome> {
        if !should_process(reminder, settings, now) {
            debug!("未到处理条件，跳过");
            metrics::record_reminder_processed(ProcessOutcome::Skipped.as_str());
            return Ok(ProcessOutcome::Skipped);
        }

        let customer = self
            .repos
            .customers
            .get_customer(&reminder.customer_id)
            .await?
            .ok_or_else(|| ReminderError::CustomerNotFound(reminder.customer_id.clone()))?;

        // 升级判定必须在发送前完成，发送后 last_sent 会被刷新
        let escalation_due = policy::should_escalate(reminder, settings, now);

        let template = match self.resolve_template(reminder).await {
            Ok(template) => template,
            Err(e @ ReminderError::TemplateNotFound { .. }) => {
                warn!(error = %e, "没有可用模板，记录失败");
                let communication = Communication::new(
                    &reminder.id,
                    &customer.id,
                    Channel::Email,
                    recipient_of(&customer),
                    now,
                )
                .mark_failed(e.to_string());

                let mut updated = reminder.clone();
                updated.last_sent = Some(now);
                self.repos
                    .communications
                    .record_attempt(&communication, &updated)
                    .await?;
                metrics::record_reminder_processed(ProcessOutcome::Failed.as_str());
                return Ok(ProcessOutcome::Failed);
            }
            Err(e) => return Err(e),
        };

        let context = self.build_context(reminder, &customer, &template, settings);
        let outcome = self.engine.send_notification_at(&context, settings, now).await;

        if outcome.deferred {
            return self
                .record_deferral(reminder, &customer, template.channel, now)
                .await;
        }

        let mut communication = Communication::new(
            &reminder.id,
            &customer.id,
            template.channel,
            recipient_of(&customer),
            now,
        );
        if let Some(message) = outcome.message {
            communication = communication.with_content(message.subject, message.body);
        }

        let mut updated = reminder.clone();
        updated.last_sent = Some(now);
        let (communication, result) = if outcome.success {
            if escalation_due && updated.apply_escalation() {
                info!(
                    escalation_level = updated.escalation_level,
                    priority = %updated.priority,
                    "提醒已升级"
                );
            }
            (communication.mark_sent(now), ProcessOutcome::Sent)
        } else {
            let reason = outcome
                .error
                .unwrap_or_else(|| ALL_CHANNELS_FAILED.to_string());
            (communication.mark_failed(reason), ProcessOutcome::Failed)
        };

        self.repos
            .communications
            .record_attempt(&communication, &updated)
            .await?;

        metrics::record_reminder_processed(result.as_str());
        Ok(result)
    }

    /// 免打扰推迟：写入 PENDING 记录，提醒本身保持不变
    ///
    /// 最近一条记录已是 PENDING 时不再重复写入
    async fn record_deferral(
        &self,
        reminder: &Reminder,
        customer: &Customer,
        channel: Channel,
        now: DateTime<Utc>,
    ) -> Result<ProcessOutcome> {
        let history = self.repos.communications.list_by_reminder(&reminder.id).await?;
        let already_pending = history
            .last()
            .is_some_and(|c| c.status == CommunicationStatus::Pending);

        if already_pending {
            debug!("已有待发送记录，跳过写入");
        } else {
            let communication =
                Communication::new(&reminder.id, &customer.id, channel, recipient_of(customer), now)
                    .mark_pending(QUIET_HOURS_ERROR);
            self.repos
                .communications
                .record_attempt(&communication, reminder)
                .await?;
        }

        metrics::record_reminder_processed(ProcessOutcome::Deferred.as_str());
        Ok(ProcessOutcome::Deferred)
    }

    /// 解析提醒使用的模板
    ///
    /// 显式指定的模板 -> 用户的 (类型, 级别) 模板 -> 内置目录
    async fn resolve_template(&self, reminder: &Reminder) -> Result<ReminderTemplate> {
        if let Some(template_id) = &reminder.template_id {
            match self.repos.templates.get_template(template_id).await? {
                Some(template) => return Ok(template),
                None => warn!(template_id = %template_id, "指定的模板不存在，回退到默认模板"),
            }
        }

        if let Some(template) = self
            .repos
            .templates
            .find_user_template(
                &reminder.user_id,
                reminder.reminder_type,
                reminder.escalation_level,
            )
            .await?
        {
            return Ok(template);
        }

        catalog::find_default(reminder.reminder_type, reminder.escalation_level)
            .cloned()
            .ok_or_else(|| ReminderError::TemplateNotFound {
                reminder_type: reminder.reminder_type.to_string(),
                escalation_level: reminder.escalation_level,
            })
    }

    fn build_context(
        &self,
        reminder: &Reminder,
        customer: &Customer,
        template: &ReminderTemplate,
        settings: &NotificationSettings,
    ) -> NotificationContext {
        let due_date = reminder
            .next_due
            .with_timezone(&settings.tz())
            .format("%Y-%m-%d")
            .to_string();
        let interval = reminder.interval_days.map(Value::from).unwrap_or(Value::Null);

        NotificationContext::new(
            customer.clone(),
            ReminderSnapshot::from(reminder),
            TemplateSnapshot::from(template),
        )
        .with_variable("customerName", customer.name.clone())
        .with_variable("customerEmail", customer.email.clone().unwrap_or_default())
        .with_variable("customerPhone", customer.phone.clone().unwrap_or_default())
        .with_variable("product", reminder.product.clone())
        .with_variable("dueDate", due_date)
        .with_variable("interval", interval)
        .with_variable("companyName", self.company_name.clone())
        .with_variable("priority", reminder.priority.as_str())
        .with_variable("escalationLevel", reminder.escalation_level)
    }
}

/// 沟通记录的收件地址：邮箱优先，其次手机号，都没有时记客户 ID
fn recipient_of(customer: &Customer) -> String {
    if customer.has_email() {
        customer.email.clone().unwrap_or_default()
    } else if customer.has_phone() {
        customer.phone.clone().unwrap_or_default()
    } else {
        customer.id.clone()
    }
}
