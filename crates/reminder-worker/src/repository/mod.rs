//! 数据访问层

mod memory;
mod traits;

pub use memory::MemoryStore;
pub use traits::*;

use std::sync::Arc;

/// 处理器依赖的全部仓储
#[derive(Clone)]
pub struct Repositories {
    pub reminders: Arc<dyn ReminderRepository>,
    pub customers: Arc<dyn CustomerRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub templates: Arc<dyn TemplateRepository>,
    pub communications: Arc<dyn CommunicationRepository>,
}

impl Repositories {
    /// 由同一个实现了全部接口的存储构建
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: ReminderRepository
            + CustomerRepository
            + SettingsRepository
            + TemplateRepository
            + CommunicationRepository
            + 'static,
    {
        Self {
            reminders: store.clone(),
            customers: store.clone(),
            settings: store.clone(),
            templates: store.clone(),
            communications: store,
        }
    }
}
