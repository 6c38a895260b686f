//! # Repository Pattern
//!
//! این فایل الگوی Repository رو برای دو entity برنامه پیاده‌سازی میکنه:
//! `ShortLink` و `ClickEvent`.
//!
//! ## Repository Pattern چیه؟
//! یه لایه انتزاعی بین منطق برنامه و دیتابیس.
//! - منطق برنامه نمیدونه داده کجا ذخیره میشه
//! - تست کردن راحت‌تر میشه
//!
//! ## عملیات داخل تراکنش
//! متدهایی که `&mut SqliteConnection` میگیرن روی اتصال یک تراکنش باز
//! اجرا میشن (`&mut *tx`). commit یا rollback با caller هست.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use super::Database;
use crate::error::{AppError, Result, UniqueField};
use crate::models::{ClickEvent, NewClickEvent, NewShortLink, ShortLink};

// =====================================
// Base Repository Trait
// =====================================
/// Trait پایه برای Repository‌های فقط-خواندنی
///
/// # مفاهیم:
/// - `#[async_trait]`: macro برای async در traits
/// - Associated Types: `type Entity` و `type Id`
#[async_trait]
pub trait Repository: Send + Sync {
    /// نوع Entity که این repository باهاش کار میکنه
    type Entity: Send + Sync;

    /// نوع شناسه (ID)
    type Id: Send + Sync + ?Sized;

    /// پیدا کردن با ID
    async fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>>;

    /// پیدا کردن همه
    async fn find_all(&self) -> Result<Vec<Self::Entity>>;

    /// شمارش کل
    async fn count(&self) -> Result<i64>;
}

// =====================================
// Unique Violation Mapping
// =====================================
/// تشخیص اینکه کدوم UNIQUE constraint نقض شده
///
/// SQLite اسم constraint رو برنمیگردونه، فقط پیامی مثل
/// `UNIQUE constraint failed: short_links.short_code`.
fn map_unique_violation(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let message = db_err.message();
            if message.contains("short_links.short_code") {
                return AppError::StoreConflict(UniqueField::ShortCode);
            }
            if message.contains("short_links.original_url") {
                return AppError::StoreConflict(UniqueField::OriginalUrl);
            }
        }
    }
    AppError::Database(err)
}

// =====================================
// ShortLink Repository
// =====================================
/// Repository برای مدیریت لینک‌های کوتاه
#[derive(Debug, Clone)]
pub struct ShortLinkRepository {
    db: Database,
}

impl ShortLinkRepository {
    /// ساخت repository جدید
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// insert لینک جدید
    ///
    /// # Errors
    /// - `StoreConflict(ShortCode)`: کد کوتاه قبلا گرفته شده
    /// - `StoreConflict(OriginalUrl)`: URL اصلی قبلا ثبت شده
    pub async fn insert(&self, new_link: &NewShortLink) -> Result<ShortLink> {
        sqlx::query_as::<_, ShortLink>(
            r#"
            INSERT INTO short_links (id, original_url, short_code, click_count, created_at, updated_at)
            VALUES (?, ?, ?, 0, ?, ?)
            RETURNING id, original_url, short_code, click_count, created_at, updated_at
            "#
        )
        .bind(new_link.id.as_str())
        .bind(&new_link.original_url)
        .bind(new_link.short_code.as_str())
        .bind(new_link.created_at)
        .bind(new_link.created_at)
        .fetch_one(self.db.pool())
        .await
        .map_err(map_unique_violation)
    }

    /// پیدا کردن با short_code
    pub async fn find_by_code(&self, short_code: &str) -> Result<Option<ShortLink>> {
        let link = sqlx::query_as::<_, ShortLink>(
            r#"
            SELECT id, original_url, short_code, click_count, created_at, updated_at
            FROM short_links
            WHERE short_code = ?
            "#
        )
        .bind(short_code)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(link)
    }

    /// پیدا کردن با URL اصلی (مقایسه دقیق و حساس به حروف)
    pub async fn find_by_original_url(&self, original_url: &str) -> Result<Option<ShortLink>> {
        let link = sqlx::query_as::<_, ShortLink>(
            r#"
            SELECT id, original_url, short_code, click_count, created_at, updated_at
            FROM short_links
            WHERE original_url = ?
            "#
        )
        .bind(original_url)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(link)
    }

    /// همه کدهای کوتاه تخصیص داده شده
    pub async fn all_codes(&self) -> Result<HashSet<String>> {
        let codes = sqlx::query_scalar::<_, String>("SELECT short_code FROM short_links")
            .fetch_all(self.db.pool())
            .await?;

        Ok(codes.into_iter().collect())
    }

    /// افزایش اتمیک شمارنده کلیک داخل تراکنش
    ///
    /// # مفاهیم:
    /// - `click_count = click_count + 1` خود دیتابیس جمع میزنه،
    ///   پس هیچ افزایشی بین نویسنده‌های همزمان گم نمیشه
    /// - `RETURNING id`: بدون خوندن دوباره، شناسه لینک رو میگیریم
    ///
    /// # Returns
    /// شناسه لینک، یا `None` اگه کد وجود نداشته باشه
    pub async fn increment_clicks(
        &self,
        conn: &mut SqliteConnection,
        short_code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<String>> {
        let id = sqlx::query_scalar::<_, String>(
            r#"
            UPDATE short_links
            SET click_count = click_count + 1, updated_at = ?
            WHERE short_code = ?
            RETURNING id
            "#
        )
        .bind(now)
        .bind(short_code)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(id)
    }
}

#[async_trait]
impl Repository for ShortLinkRepository {
    type Entity = ShortLink;
    type Id = str;

    async fn find_by_id(&self, id: &str) -> Result<Option<ShortLink>> {
        let link = sqlx::query_as::<_, ShortLink>(
            r#"
            SELECT id, original_url, short_code, click_count, created_at, updated_at
            FROM short_links
            WHERE id = ?
            "#
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(link)
    }

    /// جدیدترین لینک‌ها اول
    async fn find_all(&self) -> Result<Vec<ShortLink>> {
        let links = sqlx::query_as::<_, ShortLink>(
            r#"
            SELECT id, original_url, short_code, click_count, created_at, updated_at
            FROM short_links
            ORDER BY created_at DESC, rowid DESC
            "#
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(links)
    }

    async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM short_links")
            .fetch_one(self.db.pool())
            .await?;

        Ok(count)
    }
}

// =====================================
// Click Repository
// =====================================
/// Repository برای کلیک‌ها
#[derive(Debug, Clone)]
pub struct ClickRepository {
    db: Database,
}

impl ClickRepository {
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// insert کلیک داخل تراکنش
    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        new_click: &NewClickEvent,
    ) -> Result<ClickEvent> {
        let click = sqlx::query_as::<_, ClickEvent>(
            r#"
            INSERT INTO click_events (id, short_link_id, browser, platform, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, short_link_id, browser, platform, created_at
            "#
        )
        .bind(new_click.id.as_str())
        .bind(&new_click.short_link_id)
        .bind(&new_click.agent.browser)
        .bind(&new_click.agent.platform)
        .bind(new_click.created_at)
        .fetch_one(&mut *conn)
        .await?;

        Ok(click)
    }

    /// کلیک‌های یک لینک در بازه `[start, end]`
    ///
    /// به ترتیب ثبت (rowid) برمیگرده.
    pub async fn find_in_window(
        &self,
        short_link_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ClickEvent>> {
        let clicks = sqlx::query_as::<_, ClickEvent>(
            r#"
            SELECT id, short_link_id, browser, platform, created_at
            FROM click_events
            WHERE short_link_id = ? AND created_at >= ? AND created_at <= ?
            ORDER BY rowid ASC
            "#
        )
        .bind(short_link_id)
        .bind(start)
        .bind(end)
        .fetch_all(self.db.pool())
        .await?;

        Ok(clicks)
    }

    /// همه کلیک‌ها به ترتیب ثبت (rowid)
    pub async fn find_all(&self) -> Result<Vec<ClickEvent>> {
        let clicks = sqlx::query_as::<_, ClickEvent>(
            r#"
            SELECT id, short_link_id, browser, platform, created_at
            FROM click_events
            ORDER BY rowid ASC
            "#
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(clicks)
    }

    /// تعداد کلیک‌های ثبت شده برای یک لینک
    pub async fn count_for_link(&self, short_link_id: &str) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM click_events WHERE short_link_id = ?"
        )
        .bind(short_link_id)
        .fetch_one(self.db.pool())
        .await?;

        Ok(count)
    }

    /// تعداد کل کلیک‌ها
    pub async fn count_all(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM click_events")
            .fetch_one(self.db.pool())
            .await?;

        Ok(count)
    }
}

// =====================================
// Tests
// =====================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ShortCode, UserAgentInfo};

    fn code(s: &str) -> ShortCode {
        ShortCode::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let db = Database::in_memory().await.unwrap();
        let repo = ShortLinkRepository::new(db);

        let created = repo
            .insert(&NewShortLink::new("https://example.com/a", code("abc")))
            .await
            .unwrap();
        assert_eq!(created.click_count, 0);
        assert_eq!(created.created_at, created.updated_at);

        let by_code = repo.find_by_code("abc").await.unwrap().unwrap();
        let by_url = repo.find_by_original_url("https://example.com/a").await.unwrap().unwrap();
        let by_id = repo.find_by_id(&created.id).await.unwrap().unwrap();

        assert_eq!(by_code, created);
        assert_eq!(by_url, created);
        assert_eq!(by_id, created);
        assert!(repo.find_by_code("ABC").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unique_violations_are_classified() {
        let db = Database::in_memory().await.unwrap();
        let repo = ShortLinkRepository::new(db);

        repo.insert(&NewShortLink::new("https://example.com/a", code("abc")))
            .await
            .unwrap();

        let same_code = repo
            .insert(&NewShortLink::new("https://example.com/b", code("abc")))
            .await;
        assert!(matches!(
            same_code,
            Err(AppError::StoreConflict(UniqueField::ShortCode))
        ));

        let same_url = repo
            .insert(&NewShortLink::new("https://example.com/a", code("xyz")))
            .await;
        assert!(matches!(
            same_url,
            Err(AppError::StoreConflict(UniqueField::OriginalUrl))
        ));

        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_increment_and_click_insert_in_transaction() {
        let db = Database::in_memory().await.unwrap();
        let links = ShortLinkRepository::new(db.clone());
        let clicks = ClickRepository::new(db.clone());

        let link = links
            .insert(&NewShortLink::new("https://example.com/a", code("q1")))
            .await
            .unwrap();

        let now = Utc::now();
        let mut tx = db.begin().await.unwrap();
        let id = links.increment_clicks(&mut tx, "q1", now).await.unwrap().unwrap();
        let click = clicks
            .insert(&mut tx, &NewClickEvent::new(id, UserAgentInfo::new("Chrome", "Linux"), now))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(click.short_link_id, link.id);
        assert_eq!(links.find_by_code("q1").await.unwrap().unwrap().click_count, 1);
        assert_eq!(clicks.count_for_link(&link.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rolled_back_transaction_leaves_no_trace() {
        let db = Database::in_memory().await.unwrap();
        let links = ShortLinkRepository::new(db.clone());

        links
            .insert(&NewShortLink::new("https://example.com/a", code("q1")))
            .await
            .unwrap();

        {
            let mut tx = db.begin().await.unwrap();
            links.increment_clicks(&mut tx, "q1", Utc::now()).await.unwrap();
            // drop بدون commit
        }

        assert_eq!(links.find_by_code("q1").await.unwrap().unwrap().click_count, 0);
    }

    #[tokio::test]
    async fn test_increment_unknown_code() {
        let db = Database::in_memory().await.unwrap();
        let links = ShortLinkRepository::new(db.clone());

        let mut tx = db.begin().await.unwrap();
        let id = links.increment_clicks(&mut tx, "nope", Utc::now()).await.unwrap();
        assert!(id.is_none());
    }
}
