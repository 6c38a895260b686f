//! # مدل گزارش کلیک‌ها
//!
//! خروجی MetricsAggregator: تعداد کلیک به تفکیک روز و لیست خام مرورگر/سیستم‌عامل.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::UserAgentInfo;

/// تعداد کلیک‌های یک روز تقویمی (UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub count: i64,
}

/// گزارش کلیک‌های یک لینک در یک بازه
///
/// # Invariants:
/// - `daily_counts` به ترتیب زمانی و برای هر روز حداکثر یک ردیف داره
/// - `agent_breakdown` به ترتیب ثبت کلیک‌هاست و dedup نمیشه
/// - مجموع `count`‌ها برابر طول `agent_breakdown` هست
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub daily_counts: Vec<DailyCount>,
    pub agent_breakdown: Vec<UserAgentInfo>,
}

impl MetricsReport {
    /// تعداد کل کلیک‌های داخل بازه
    #[must_use]
    pub fn total_clicks(&self) -> usize {
        self.agent_breakdown.len()
    }

    /// آیا هیچ کلیکی در بازه نبوده؟
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agent_breakdown.is_empty()
    }
}

/// پاسخ API برای پنل آمار ماه جاری
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsPanelResponse {
    pub short_code: String,

    /// نام ماه (مثلا "October")
    pub month: String,

    #[serde(flatten)]
    pub report: MetricsReport,
}
