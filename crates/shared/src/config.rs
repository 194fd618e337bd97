//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::error::{Result, SharedError};
use crate::observability::ObservabilityConfig;

/// SMTP 邮件配置
///
/// host 为空时邮件发送器以 no-op 模式运行（仅记录日志）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// true 使用隐式 TLS（通常 465 端口），false 使用 STARTTLS
    pub secure: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: String,
    pub from_name: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 587,
            secure: false,
            username: None,
            password: None,
            from_address: "noreply@example.com".to_string(),
            from_name: "Reminder Service".to_string(),
        }
    }
}

impl SmtpConfig {
    /// 是否配置了真实的 SMTP 服务器
    pub fn is_configured(&self) -> bool {
        !self.host.trim().is_empty()
    }

    /// 构建邮件头 From 字段，如 `Reminder Service <noreply@example.com>`
    pub fn mailbox(&self) -> String {
        if self.from_name.trim().is_empty() {
            self.from_address.clone()
        } else {
            format!("{} <{}>", self.from_name, self.from_address)
        }
    }
}

/// 提醒 Worker 配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// 是否启动周期性提醒扫描
    pub enabled: bool,
    /// 轮询间隔（秒）
    pub poll_interval_secs: u64,
    /// 模板变量 companyName 的取值
    pub company_name: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_secs: 3600,
            company_name: "Our Company".to_string(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub observability: ObservabilityConfig,
    pub smtp: SmtpConfig,
    pub worker: WorkerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: "reminder-worker".to_string(),
            environment: "development".to_string(),
            observability: ObservabilityConfig::default(),
            smtp: SmtpConfig::default(),
            worker: WorkerConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. .env 文件（存在时注入进程环境变量）
    /// 2. config/default.toml（默认配置）
    /// 3. config/{environment}.toml（环境特定配置）
    /// 4. config/{service_name}.toml（服务特定配置）
    /// 5. 环境变量（REMINDER_ 前缀，双下划线分隔层级，如 REMINDER_SMTP__HOST -> smtp.host）
    pub fn load(service_name: &str) -> Result<Self> {
        // .env 不存在是正常情况
        let _ = dotenvy::dotenv();

        let env = std::env::var("REMINDER_ENV").unwrap_or_else(|_| "development".to_string());
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env.clone())?
            .add_source(File::from(Path::new(&config_dir).join("default.toml")).required(false))
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", env))).required(false),
            )
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", service_name)))
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("REMINDER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 校验加载后的配置项
    pub fn validate(&self) -> Result<()> {
        if self.worker.poll_interval_secs == 0 {
            return Err(SharedError::invalid_config(
                "worker.poll_interval_secs",
                "必须大于 0",
            ));
        }
        if self.smtp.is_configured() && !self.smtp.from_address.contains('@') {
            return Err(SharedError::invalid_config(
                "smtp.from_address",
                format!("不是有效的邮箱地址: {}", self.smtp.from_address),
            ));
        }
        Ok(())
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
