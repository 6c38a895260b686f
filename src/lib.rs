//! # Shortlink Metrics Library
//!
//! این کتابخانه یک سرویس کوتاه‌کننده URL همراه با آمار کلیک‌ها ارائه میده.
//!
//! ## ساختار پروژه
//!
//! ```text
//! src/
//! ├── lib.rs          # نقطه ورود کتابخانه - اینجا!
//! ├── main.rs         # نقطه ورود باینری
//! ├── config/         # مدیریت تنظیمات
//! ├── error/          # تعریف خطاها
//! ├── database/       # لایه دیتابیس (SQLite + migration‌ها)
//! ├── models/         # مدل‌های داده
//! ├── services/       # تولید کد، ثبت لینک، ثبت کلیک، گزارش
//! ├── api/            # لایه API
//! └── utils/          # توابع کمکی
//! ```
//!
//! ## مفاهیم Rust در این فایل
//!
//! - **Module System**: سیستم ماژول‌ها برای سازماندهی کد
//! - **Public API**: با `pub` مشخص میکنیم چی از بیرون قابل دسترسی باشه
//! - **Re-exports**: با `pub use` آیتم‌ها رو re-export میکنیم
//!
//! ## مثال استفاده
//!
//! ```rust,no_run
//! use shortlink_metrics::{database::Database, services::{ClickRecorder, CodeGenerator, UrlRegistry}};
//! use shortlink_metrics::database::ShortLinkRepository;
//!
//! #[tokio::main]
//! async fn main() -> shortlink_metrics::Result<()> {
//!     let db = Database::in_memory().await?;
//!     let registry = UrlRegistry::new(ShortLinkRepository::new(db.clone()), CodeGenerator::default());
//!
//!     let link = registry.create_short_link("https://example.com/a").await?;
//!     ClickRecorder::new(db).record_click(&link.short_code, "Chrome", "Windows").await?;
//!     Ok(())
//! }
//! ```

// =====================================
// Module Declarations
// =====================================

/// ماژول مدیریت تنظیمات برنامه
pub mod config;

/// ماژول تعریف و مدیریت خطاها
pub mod error;

/// ماژول ارتباط با دیتابیس
pub mod database;

/// ماژول مدل‌های داده (Domain Models)
pub mod models;

/// ماژول سرویس‌ها (Business Logic)
pub mod services;

/// ماژول API و HTTP Handlers
pub mod api;

/// ماژول توابع کمکی
pub mod utils;

// =====================================
// Re-exports
// =====================================
// کاربر به جای `shortlink_metrics::error::Result` میتونه بنویسه `shortlink_metrics::Result`

/// نتیجه عملیات با خطای سفارشی ما
pub use error::Result;

/// خطای اصلی برنامه
pub use error::AppError;

// =====================================
// Prelude Module
// =====================================
/// ماژول prelude برای import راحت‌تر آیتم‌های پرکاربرد
///
/// کاربرد:
/// ```rust
/// use shortlink_metrics::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::database::Database;
    pub use crate::error::{AppError, Result};
    pub use crate::models::*;
    pub use crate::services::*;
}
