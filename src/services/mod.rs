//! # ماژول سرویس‌ها (Business Logic Layer)
//!
//! این ماژول منطق کسب‌وکار برنامه رو پیاده‌سازی میکنه.
//!
//! ## لایه‌بندی معماری
//!
//! ```text
//! ┌─────────────────┐
//! │    API Layer    │  <-- HTTP handlers (axum)
//! ├─────────────────┤
//! │  Service Layer  │  <-- Registry, Clicks, Metrics (اینجا!)
//! ├─────────────────┤
//! │ Repository Layer│  <-- Data access
//! ├─────────────────┤
//! │    Database     │  <-- SQLite
//! └─────────────────┘
//! ```
//!
//! ## مفاهیم Rust:
//! - **Dependency Injection**: تزریق وابستگی‌ها
//! - **Arc<T>**: اشتراک امن بین threads
//! - **CancellationToken**: لغو cooperative عملیات‌ها
//!
//! هیچ state مشترک تغییرپذیری جز دیتابیس وجود نداره.

mod clicks;
mod context;
mod generator;
mod metrics;
mod registry;

pub use clicks::*;
pub use context::*;
pub use generator::*;
pub use metrics::*;
pub use registry::*;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    database::{ClickRepository, Database, ShortLinkRepository},
};

// =====================================
// Application State
// =====================================
/// وضعیت برنامه که بین همه handlers اشتراک‌گذاری میشه
///
/// # مفاهیم:
/// - `Arc<T>`: Reference counting برای thread-safe sharing
/// - `Clone`: کپی کردن (فقط Arc clone میشه، نه داده)
/// - این state در axum با `with_state` تزریق میشه
#[derive(Clone)]
pub struct AppState {
    /// تنظیمات برنامه
    pub config: Arc<Config>,

    /// ثبت و جستجوی لینک‌ها
    pub registry: Arc<UrlRegistry>,

    /// ثبت کلیک‌ها
    pub clicks: Arc<ClickRecorder>,

    /// گزارش‌گیری
    pub metrics: Arc<MetricsAggregator>,

    /// برای health check
    pub db: Database,

    /// token خاموش شدن سرور؛ context هر درخواست فرزند اینه
    pub shutdown: CancellationToken,
}

impl AppState {
    /// ساخت AppState جدید
    ///
    /// # مفاهیم:
    /// - Factory method: ساخت object پیچیده
    /// - Dependency Injection: همه وابستگی‌ها تزریق میشن
    #[must_use]
    pub fn new(db: Database, config: Config) -> Self {
        let config = Arc::new(config);

        let registry = UrlRegistry::new(
            ShortLinkRepository::new(db.clone()),
            CodeGenerator::new(config.max_code_attempts),
        );
        let clicks = ClickRecorder::new(db.clone());
        let metrics = MetricsAggregator::new(registry.clone(), ClickRepository::new(db.clone()));

        Self {
            config,
            registry: Arc::new(registry),
            clicks: Arc::new(clicks),
            metrics: Arc::new(metrics),
            db,
            shutdown: CancellationToken::new(),
        }
    }

    /// دسترسی به config
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// context یک درخواست: مهلت از config، لغو با خاموش شدن سرور
    #[must_use]
    pub fn call_context(&self) -> CallContext {
        CallContext::with_timeout(self.config.request_timeout()).child_of(&self.shutdown)
    }
}

