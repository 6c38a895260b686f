//! # مدل ClickEvent
//!
//! هر بار که یک کد کوتاه با موفقیت redirect میشه، یک ClickEvent ثبت میشه.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Id;

/// مقدار پیش‌فرض وقتی مرورگر یا سیستم‌عامل قابل تشخیص نیست
pub const UNKNOWN_AGENT: &str = "Other";

// =====================================
// ClickEvent Entity
// =====================================
/// یک کلیک ثبت شده روی لینک کوتاه
///
/// بعد از ساخت هیچ‌وقت تغییر نمیکنه.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ClickEvent {
    pub id: String,

    /// لینکی که این کلیک بهش تعلق داره
    pub short_link_id: String,

    pub browser: String,
    pub platform: String,

    /// زمان کلیک
    pub created_at: DateTime<Utc>,
}

impl ClickEvent {
    /// جفت (browser, platform) این کلیک
    #[must_use]
    pub fn agent(&self) -> UserAgentInfo {
        UserAgentInfo::new(self.browser.clone(), self.platform.clone())
    }
}

/// یک کلیک در لیست لینک‌ها (بدون شناسه‌ها)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickSummary {
    pub created_at: DateTime<Utc>,
    pub browser: String,
    pub platform: String,
}

impl From<&ClickEvent> for ClickSummary {
    fn from(event: &ClickEvent) -> Self {
        Self {
            created_at: event.created_at,
            browser: event.browser.clone(),
            platform: event.platform.clone(),
        }
    }
}

/// داده برای insert یک کلیک جدید
#[derive(Debug, Clone)]
pub struct NewClickEvent {
    pub id: Id,
    pub short_link_id: String,
    pub agent: UserAgentInfo,
    pub created_at: DateTime<Utc>,
}

impl NewClickEvent {
    #[must_use]
    pub fn new(short_link_id: impl Into<String>, agent: UserAgentInfo, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Id::new(),
            short_link_id: short_link_id.into(),
            agent,
            created_at,
        }
    }
}

// =====================================
// User Agent
// =====================================
/// مرورگر و سیستم‌عامل کاربر (از قبل parse شده)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserAgentInfo {
    pub browser: String,
    pub platform: String,
}

impl UserAgentInfo {
    #[must_use]
    pub fn new(browser: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            browser: browser.into(),
            platform: platform.into(),
        }
    }

    /// وقتی هیچ User-Agent‌ای نداریم
    #[must_use]
    pub fn unknown() -> Self {
        Self::new(UNKNOWN_AGENT, UNKNOWN_AGENT)
    }
}
