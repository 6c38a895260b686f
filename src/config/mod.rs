//! # ماژول تنظیمات (Configuration)
//!
//! این ماژول مسئول خوندن و مدیریت تنظیمات برنامه هست.
//!
//! ## منابع تنظیمات (به ترتیب اولویت):
//! 1. متغیرهای محیطی با پیشوند `SHORTLINK_` (مثلا `SHORTLINK_PORT=8080`)
//! 2. `DATABASE_URL` (قرارداد رایج sqlx) برای آدرس دیتابیس
//! 3. مقادیر پیش‌فرض `Config::default()`
//!
//! فایل `.env` قبل از همه در `main` توسط `dotenvy` لود میشه.
//!
//! ## مفاهیم Rust:
//! - **Default Trait**: مقادیر پیش‌فرض
//! - **Serde**: دسریالایز از منبع تنظیمات
//! - **Builder Pattern**: ساخت تدریجی آبجکت

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// پیشوند متغیرهای محیطی
pub const ENV_PREFIX: &str = "SHORTLINK";

/// سقف پیش‌فرض تلاش برای پیدا کردن کد کوتاه آزاد
pub const DEFAULT_MAX_CODE_ATTEMPTS: u32 = 10_000;

/// تنظیمات اصلی برنامه
///
/// # مثال
/// ```rust
/// use shortlink_metrics::config::Config;
///
/// let config = Config::default();
/// println!("Port: {}", config.port);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// آدرس هاست سرور
    pub host: String,

    /// پورت سرور
    pub port: u16,

    /// آدرس پایه برای لینک‌های کوتاه
    pub base_url: String,

    /// آدرس اتصال به دیتابیس
    pub database_url: String,

    /// حداکثر تعداد اتصال‌های pool
    pub max_connections: u32,

    /// سقف تلاش‌های CodeGenerator
    pub max_code_attempts: u32,

    /// مهلت هر درخواست (ثانیه)
    pub request_timeout_secs: u64,

    /// محیط اجرا (development, production)
    pub environment: Environment,
}

/// محیط اجرای برنامه
///
/// # مفاهیم:
/// - `#[serde(from = "String")]`: دسریالایز از طریق `From<String>`
///   تا "prod" و "PROD" هم پذیرفته بشن
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Environment {
    /// محیط توسعه - با قابلیت‌های دیباگ
    #[default]
    Development,

    /// محیط تست
    Testing,

    /// محیط تولید - بهینه‌سازی شده
    Production,
}

impl Environment {
    /// آیا در محیط تولید هستیم؟
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "testing" | "test" => Environment::Testing,
            _ => Environment::Development,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            database_url: "sqlite://data/links.db?mode=rwc".to_string(),
            max_connections: 10,
            max_code_attempts: DEFAULT_MAX_CODE_ATTEMPTS,
            request_timeout_secs: 30,
            environment: Environment::Development,
        }
    }
}

impl Config {
    /// ساخت تنظیمات از متغیرهای محیطی
    ///
    /// # مفاهیم:
    /// - `config::Config::builder()`: ترکیب لایه‌ای منابع تنظیمات
    /// - `set_default`: پایین‌ترین اولویت
    /// - `try_deserialize`: تبدیل به struct خودمون با serde
    ///
    /// # Errors
    /// خطا برمیگردونه اگه مقدار یه متغیر قابل parse نباشه
    ///
    /// # مثال
    /// ```rust,no_run
    /// use shortlink_metrics::config::Config;
    ///
    /// let config = Config::from_env().expect("Failed to load config");
    /// ```
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        // DATABASE_URL فقط وقتی استفاده میشه که SHORTLINK_DATABASE_URL نباشه
        let database_url = env::var("DATABASE_URL").unwrap_or(defaults.database_url);

        let config = config::Config::builder()
            .set_default("database_url", database_url)?
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX).try_parsing(true),
            )
            .build()?
            .try_deserialize::<Self>()?;

        Ok(config)
    }

    /// اعتبارسنجی تنظیمات
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(AppError::Config("PORT cannot be 0".to_string()));
        }

        if self.max_code_attempts == 0 {
            return Err(AppError::Config(
                "MAX_CODE_ATTEMPTS must be at least 1".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "REQUEST_TIMEOUT_SECS must be at least 1".to_string(),
            ));
        }

        if self.max_connections == 0 {
            return Err(AppError::Config(
                "MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }

        if !crate::utils::is_valid_url(&self.base_url) {
            return Err(AppError::Config(format!(
                "BASE_URL '{}' is not an absolute URL",
                self.base_url
            )));
        }

        Ok(())
    }

    /// آدرس کامل سرور
    #[must_use]
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// مهلت هر درخواست
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// =====================================
// Builder Pattern
// =====================================
/// ساخت Config با Builder Pattern
///
/// # مثال
/// ```rust
/// use shortlink_metrics::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .port(8080)
///     .host("0.0.0.0")
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// ساخت builder جدید
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// تنظیم پورت
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// تنظیم هاست
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// تنظیم base_url
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// تنظیم database_url
    #[must_use]
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = url.into();
        self
    }

    /// تنظیم حداکثر اتصال‌های pool دیتابیس
    #[must_use]
    pub fn max_connections(mut self, max: u32) -> Self {
        self.config.max_connections = max;
        self
    }

    /// تنظیم سقف تلاش تولید کد
    #[must_use]
    pub fn max_code_attempts(mut self, attempts: u32) -> Self {
        self.config.max_code_attempts = attempts;
        self
    }

    /// تنظیم مهلت درخواست
    #[must_use]
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    /// تنظیم محیط
    #[must_use]
    pub fn environment(mut self, env: Environment) -> Self {
        self.config.environment = env;
        self
    }

    /// ساخت Config نهایی
    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }

    /// ساخت Config با اعتبارسنجی
    ///
    /// # Errors
    /// خطا برمیگردونه اگه اعتبارسنجی fail بشه
    pub fn build_validated(self) -> Result<Config> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
