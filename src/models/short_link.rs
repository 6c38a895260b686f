//! # مدل ShortLink
//!
//! Entity و DTO‌های مربوط به نگاشت URL اصلی به کد کوتاه

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{ClickSummary, Id, ShortCode};

// =====================================
// ShortLink Entity
// =====================================
/// Entity اصلی لینک کوتاه
///
/// # Invariants:
/// - `short_code` و `original_url` هر دو در کل دیتابیس یکتا هستن
/// - `click_count` برابر تعداد ClickEvent‌های این لینکه
/// - `short_code` و `created_at` بعد از ساخت تغییر نمیکنن
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ShortLink {
    /// شناسه یکتا
    pub id: String,

    /// آدرس اصلی
    pub original_url: String,

    /// کد کوتاه (مثلا "aZ9")
    pub short_code: String,

    /// تعداد کلیک
    pub click_count: i64,

    /// تاریخ ایجاد
    pub created_at: DateTime<Utc>,

    /// تاریخ آخرین بروزرسانی (با هر کلیک هم عوض میشه)
    pub updated_at: DateTime<Utc>,
}

impl ShortLink {
    /// گرفتن لینک کوتاه کامل
    #[must_use]
    pub fn short_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.short_code)
    }
}

// =====================================
// New ShortLink (داخلی)
// =====================================
/// داده برای insert یک لینک جدید
///
/// این DTO برای ارسال به Repository استفاده میشه
#[derive(Debug, Clone)]
pub struct NewShortLink {
    pub id: Id,
    pub original_url: String,
    pub short_code: ShortCode,
    pub created_at: DateTime<Utc>,
}

impl NewShortLink {
    /// ساخت با شناسه تازه و زمان فعلی
    #[must_use]
    pub fn new(original_url: impl Into<String>, short_code: ShortCode) -> Self {
        Self {
            id: Id::new(),
            original_url: original_url.into(),
            short_code,
            created_at: Utc::now(),
        }
    }
}

// =====================================
// API Request DTOs
// =====================================
/// درخواست ساخت لینک کوتاه
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateShortLinkRequest {
    /// آدرس اصلی
    #[validate(length(min = 1, max = 2048, message = "The original URL length is invalid"))]
    pub original_url: String,
}

// =====================================
// API Response DTOs
// =====================================
/// پاسخ لینک کوتاه
///
/// این DTO به کلاینت ارسال میشه
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortLinkResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,

    /// کلیک‌های این لینک به ترتیب ثبت
    #[serde(default)]
    pub metrics: Vec<ClickSummary>,
}

impl ShortLinkResponse {
    /// تبدیل از ShortLink entity
    #[must_use]
    pub fn from_link(link: &ShortLink, base_url: &str) -> Self {
        Self {
            short_code: link.short_code.clone(),
            short_url: link.short_url(base_url),
            original_url: link.original_url.clone(),
            clicks: link.click_count,
            created_at: link.created_at,
            metrics: Vec::new(),
        }
    }

    /// اضافه کردن کلیک‌های لینک
    #[must_use]
    pub fn with_metrics(mut self, metrics: Vec<ClickSummary>) -> Self {
        self.metrics = metrics;
        self
    }
}
