//! # ثبت کلیک (ClickRecorder)
//!
//! افزایش شمارنده و insert رویداد کلیک داخل یک تراکنش انجام میشه.
//! شمارنده با `click_count = click_count + 1` در خود دیتابیس زیاد میشه،
//! پس کلیک‌های همزمان روی یک کد هیچ‌وقت گم نمیشن.

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use crate::{
    database::{ClickRepository, Database, ShortLinkRepository},
    error::{AppError, Result},
    models::{ClickEvent, NewClickEvent, ShortCode, UserAgentInfo},
};

/// سرویس ثبت کلیک‌ها
#[derive(Debug, Clone)]
pub struct ClickRecorder {
    db: Database,
    links: ShortLinkRepository,
    clicks: ClickRepository,
}

impl ClickRecorder {
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self {
            links: ShortLinkRepository::new(db.clone()),
            clicks: ClickRepository::new(db.clone()),
            db,
        }
    }

    /// ثبت یک کلیک با زمان فعلی
    ///
    /// # Errors
    /// `NotFound` اگه کد وجود نداشته باشه؛ در این حالت هیچ چیزی نوشته نمیشه.
    pub async fn record_click(
        &self,
        short_code: &str,
        browser: &str,
        platform: &str,
    ) -> Result<ClickEvent> {
        self.record_click_at(short_code, UserAgentInfo::new(browser, platform), Utc::now())
            .await
    }

    /// ثبت یک کلیک با زمان مشخص
    ///
    /// # مفاهیم:
    /// - اولین دستور تراکنش یک UPDATE هست، پس قفل نوشتن SQLite از همون اول
    ///   گرفته میشه و تراکنش وسط کار از read به write ارتقا پیدا نمیکنه
    /// - هر `?` یا drop شدن future قبل از `commit` یعنی rollback
    #[instrument(skip(self, agent), fields(browser = %agent.browser, platform = %agent.platform))]
    pub async fn record_click_at(
        &self,
        short_code: &str,
        agent: UserAgentInfo,
        at: DateTime<Utc>,
    ) -> Result<ClickEvent> {
        let code = ShortCode::parse(short_code)
            .ok_or_else(|| AppError::link_not_found(short_code))?;

        let mut tx = self.db.begin().await?;

        let link_id = self
            .links
            .increment_clicks(&mut tx, code.as_str(), at)
            .await?
            .ok_or_else(|| AppError::link_not_found(short_code))?;

        let click = self
            .clicks
            .insert(&mut tx, &NewClickEvent::new(link_id, agent, at))
            .await?;

        tx.commit().await?;

        debug!(link_id = %click.short_link_id, click_id = %click.id, "Recorded click");
        Ok(click)
    }
}

// =====================================
// Tests
// =====================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{database::Repository, services::CodeGenerator, services::UrlRegistry};

    async fn setup() -> (Database, UrlRegistry, ClickRecorder) {
        let db = Database::in_memory().await.unwrap();
        let registry = UrlRegistry::new(ShortLinkRepository::new(db.clone()), CodeGenerator::default());
        let recorder = ClickRecorder::new(db.clone());
        (db, registry, recorder)
    }

    #[tokio::test]
    async fn test_record_click_updates_counter() {
        let (db, registry, recorder) = setup().await;
        let link = registry.create_short_link("https://example.com/a").await.unwrap();

        let click = recorder
            .record_click(&link.short_code, "Chrome", "Windows")
            .await
            .unwrap();

        assert_eq!(click.short_link_id, link.id);
        assert_eq!(click.agent(), UserAgentInfo::new("Chrome", "Windows"));

        let updated = registry.find_by_code(&link.short_code).await.unwrap().unwrap();
        assert_eq!(updated.click_count, 1);
        assert_eq!(updated.updated_at, click.created_at);
        assert_eq!(updated.created_at, link.created_at);
        assert_eq!(ClickRepository::new(db).count_for_link(&link.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_code_writes_nothing() {
        let (db, registry, recorder) = setup().await;
        let link = registry.create_short_link("https://example.com/a").await.unwrap();

        for code in ["zzzzz", "", "bad!"] {
            let result = recorder.record_click(code, "Chrome", "Windows").await;
            assert!(matches!(result, Err(AppError::NotFound(_))));
        }

        let links = ShortLinkRepository::new(db.clone());
        assert_eq!(links.find_by_id(&link.id).await.unwrap().unwrap(), link);
        assert_eq!(ClickRepository::new(db).count_all().await.unwrap(), 0);
    }
}
