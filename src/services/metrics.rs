//! # گزارش کلیک‌ها (MetricsAggregator)
//!
//! کلیک‌های یک لینک در بازه `[start, end]` رو میخونه و دو خروجی میسازه:
//! - تعداد کلیک به تفکیک روز (UTC)، به ترتیب زمانی
//! - لیست خام (browser, platform) به ترتیب ثبت
//!
//! فقط خواندنیه و با ثبت کلیک‌های همزمان linearize نمیشه.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use tracing::instrument;

use crate::{
    database::ClickRepository,
    error::{AppError, Result},
    models::{ClickEvent, DailyCount, MetricsReport},
    utils,
};

use super::UrlRegistry;

/// سرویس گزارش‌گیری
#[derive(Debug, Clone)]
pub struct MetricsAggregator {
    registry: UrlRegistry,
    clicks: ClickRepository,
}

impl MetricsAggregator {
    #[must_use]
    pub fn new(registry: UrlRegistry, clicks: ClickRepository) -> Self {
        Self { registry, clicks }
    }

    /// گزارش کلیک‌ها در بازه بسته `[start, end]`
    ///
    /// # Errors
    /// `NotFound` اگه کد وجود نداشته باشه. بازه خالی خطا نیست.
    #[instrument(skip(self))]
    pub async fn summarize(
        &self,
        short_code: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<MetricsReport> {
        let link = self
            .registry
            .find_by_code(short_code)
            .await?
            .ok_or_else(|| AppError::link_not_found(short_code))?;

        let events = self.clicks.find_in_window(&link.id, start, end).await?;

        Ok(build_report(&events))
    }

    /// گزارش ماه تقویمی (UTC) که `now` داخلشه
    pub async fn summarize_month(
        &self,
        short_code: &str,
        now: DateTime<Utc>,
    ) -> Result<MetricsReport> {
        let (start, end) = utils::month_window(now);
        self.summarize(short_code, start, end).await
    }

    /// تعداد کل کلیک‌های ثبت شده روی همه لینک‌ها
    pub async fn total_clicks(&self) -> Result<i64> {
        self.clicks.count_all().await
    }

    /// همه کلیک‌ها، گروه‌بندی شده با شناسه لینک
    ///
    /// داخل هر گروه ترتیب ثبت حفظ میشه.
    pub async fn clicks_by_link(&self) -> Result<HashMap<String, Vec<ClickEvent>>> {
        let mut grouped: HashMap<String, Vec<ClickEvent>> = HashMap::new();
        for event in self.clicks.find_all().await? {
            grouped.entry(event.short_link_id.clone()).or_default().push(event);
        }

        Ok(grouped)
    }
}

/// ساخت گزارش از کلیک‌هایی که به ترتیب ثبت مرتب شدن
fn build_report(events: &[ClickEvent]) -> MetricsReport {
    let mut per_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for event in events {
        *per_day.entry(event.created_at.date_naive()).or_insert(0) += 1;
    }

    MetricsReport {
        daily_counts: per_day
            .into_iter()
            .map(|(day, count)| DailyCount { day, count })
            .collect(),
        agent_breakdown: events.iter().map(ClickEvent::agent).collect(),
    }
}

// =====================================
// Tests
// =====================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserAgentInfo;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn event(at: DateTime<Utc>, browser: &str, platform: &str) -> ClickEvent {
        ClickEvent {
            id: crate::models::Id::new().into_string(),
            short_link_id: "link".to_string(),
            browser: browser.to_string(),
            platform: platform.to_string(),
            created_at: at,
        }
    }

    #[test]
    fn test_build_report_buckets_by_day() {
        let d1 = Utc.with_ymd_and_hms(2024, 3, 5, 23, 59, 59).unwrap();
        let d2 = Utc.with_ymd_and_hms(2024, 3, 6, 0, 0, 0).unwrap();

        // ترتیب ثبت لزوما ترتیب زمانی نیست
        let events = vec![
            event(d2, "Safari", "Mac OS X"),
            event(d1, "Chrome", "Windows"),
            event(d1, "Chrome", "Windows"),
        ];

        let report = build_report(&events);

        assert_eq!(
            report.daily_counts,
            vec![
                DailyCount { day: d1.date_naive(), count: 2 },
                DailyCount { day: d2.date_naive(), count: 1 },
            ]
        );
        assert_eq!(
            report.agent_breakdown,
            vec![
                UserAgentInfo::new("Safari", "Mac OS X"),
                UserAgentInfo::new("Chrome", "Windows"),
                UserAgentInfo::new("Chrome", "Windows"),
            ]
        );
        assert_eq!(report.total_clicks(), 3);
    }

    #[test]
    fn test_build_report_empty() {
        let report = build_report(&[]);
        assert!(report.is_empty());
        assert_eq!(report, MetricsReport::default());
    }

    #[tokio::test]
    async fn test_clicks_by_link_groups_in_recording_order() {
        use crate::database::{Database, ShortLinkRepository};
        use crate::services::{ClickRecorder, CodeGenerator};

        let db = Database::in_memory().await.unwrap();
        let registry = UrlRegistry::new(ShortLinkRepository::new(db.clone()), CodeGenerator::default());
        let recorder = ClickRecorder::new(db.clone());
        let aggregator = MetricsAggregator::new(registry.clone(), ClickRepository::new(db));

        let a = registry.create_short_link("https://example.com/a").await.unwrap();
        let b = registry.create_short_link("https://example.com/b").await.unwrap();
        let quiet = registry.create_short_link("https://example.com/quiet").await.unwrap();

        recorder.record_click(&a.short_code, "Chrome", "Windows").await.unwrap();
        recorder.record_click(&b.short_code, "Firefox", "Linux").await.unwrap();
        recorder.record_click(&a.short_code, "Safari", "iOS").await.unwrap();

        let grouped = aggregator.clicks_by_link().await.unwrap();

        let browsers: Vec<&str> = grouped[&a.id].iter().map(|e| e.browser.as_str()).collect();
        assert_eq!(browsers, vec!["Chrome", "Safari"]);
        assert_eq!(grouped[&b.id].len(), 1);
        assert!(!grouped.contains_key(&quiet.id));
    }
}
