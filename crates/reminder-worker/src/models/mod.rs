//! 领域模型定义

pub mod communication;
pub mod enums;
pub mod reminder;
pub mod settings;
pub mod template;

pub use communication::Communication;
pub use enums::{Channel, CommunicationStatus, Priority, ReminderType};
pub use reminder::{Customer, Reminder};
pub use settings::NotificationSettings;
pub use template::ReminderTemplate;
