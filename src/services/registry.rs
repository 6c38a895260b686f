//! # سرویس ثبت لینک (UrlRegistry)
//!
//! نگاشت URL اصلی <-> کد کوتاه رو مدیریت میکنه.
//!
//! ## یکتایی زیر همزمانی
//! چک "کد آزاده؟" داخل حافظه فقط یک حدس اولیه هست. تضمین واقعی UNIQUE
//! constraint دیتابیسه:
//! - conflict روی `short_code`: کد رو به مجموعه گرفته‌شده‌ها اضافه کن و دوباره قرعه بکش
//! - conflict روی `original_url`: `DuplicateUrl`

use std::collections::HashSet;

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{error, info, instrument, warn};

use crate::{
    database::{Repository, ShortLinkRepository},
    error::{AppError, Result, UniqueField},
    models::{NewShortLink, ShortCode, ShortLink},
    utils,
};

use super::CodeGenerator;

// =====================================
// URL Registry
// =====================================
/// سرویس مدیریت لینک‌های کوتاه
///
/// # مسئولیت‌ها:
/// - اعتبارسنجی URL اصلی
/// - تخصیص کد یکتا با retry روی conflict
/// - جستجو با کد یا URL اصلی
#[derive(Debug, Clone)]
pub struct UrlRegistry {
    repo: ShortLinkRepository,
    generator: CodeGenerator,
}

impl UrlRegistry {
    /// ساخت سرویس جدید
    #[must_use]
    pub fn new(repo: ShortLinkRepository, generator: CodeGenerator) -> Self {
        Self { repo, generator }
    }

    /// ساخت لینک کوتاه جدید
    ///
    /// منبع تصادفی یک `StdRng` تازه هست؛ برخلاف `thread_rng()` این `Send` هست
    /// و میتونه از روی `.await` رد بشه.
    ///
    /// # Errors
    /// - `InvalidUrl`: URL معتبر نیست (چیزی ذخیره نمیشه)
    /// - `DuplicateUrl`: این URL قبلا ثبت شده
    /// - `ExhaustedCodeSpace`: بعد از `max_attempts` تلاش کد آزاد پیدا نشد
    pub async fn create_short_link(&self, original_url: &str) -> Result<ShortLink> {
        let mut rng = StdRng::from_entropy();
        self.create_short_link_with_rng(original_url, &mut rng).await
    }

    /// ساخت لینک کوتاه با منبع تصادفی مشخص
    ///
    /// # مفاهیم:
    /// - `#[instrument]`: span با فیلد `original_url`
    /// - Generic over `Rng`: تست‌ها با seed ثابت قطعی میشن
    /// - URL نرمال‌شده (بدون فاصله ابتدا و انتها) ذخیره میشه
    ///
    /// # Errors
    /// مثل `create_short_link`
    #[instrument(skip(self, rng))]
    pub async fn create_short_link_with_rng<R: Rng + Send>(
        &self,
        original_url: &str,
        rng: &mut R,
    ) -> Result<ShortLink> {
        // Step 1: اعتبارسنجی و نرمال‌سازی
        let original_url = utils::normalize_url(original_url).map_err(AppError::InvalidUrl)?;

        // Step 2: snapshot کدهای موجود
        let taken: HashSet<String> = self.repo.all_codes().await?;

        // Step 3: قرعه + insert
        self.insert_with_retry(&original_url, taken, rng).await
    }

    /// قرعه + insert، تا وقتی دیتابیس قبول کنه
    ///
    /// `taken` ممکنه کهنه باشه؛ conflict روی `short_code` کد رو بهش اضافه میکنه.
    async fn insert_with_retry<R: Rng + Send>(
        &self,
        original_url: &str,
        mut taken: HashSet<String>,
        rng: &mut R,
    ) -> Result<ShortLink> {
        let max_attempts = self.generator.max_attempts();

        for attempt in 1..=max_attempts {
            let short_code = self.generator.allocate(&mut *rng, &taken)?;
            let new_link = NewShortLink::new(original_url, short_code.clone());

            match self.repo.insert(&new_link).await {
                Ok(link) => {
                    info!(
                        short_code = %link.short_code,
                        link_id = %link.id,
                        attempt,
                        "Created new short link"
                    );
                    return Ok(link);
                }
                Err(AppError::StoreConflict(UniqueField::ShortCode)) => {
                    warn!(short_code = %short_code, attempt, "Short code taken concurrently, retrying");
                    taken.insert(short_code.into_string());
                }
                Err(AppError::StoreConflict(UniqueField::OriginalUrl)) => {
                    return Err(AppError::duplicate_url(original_url));
                }
                Err(e) => return Err(e),
            }
        }

        error!(attempts = max_attempts, "Gave up inserting short link after repeated code conflicts");
        Err(AppError::ExhaustedCodeSpace {
            attempts: max_attempts,
        })
    }

    /// پیدا کردن لینک با کد کوتاه
    ///
    /// کدی که فرمتش معتبر نیست اصلا به دیتابیس نمیرسه.
    #[instrument(skip(self))]
    pub async fn find_by_code(&self, short_code: &str) -> Result<Option<ShortLink>> {
        match ShortCode::parse(short_code) {
            Some(code) => self.repo.find_by_code(code.as_str()).await,
            None => Ok(None),
        }
    }

    /// پیدا کردن لینک با URL اصلی
    ///
    /// مقایسه دقیق، بعد از حذف فاصله‌های ابتدا و انتها مثل زمان ساخت.
    #[instrument(skip(self))]
    pub async fn find_by_original_url(&self, original_url: &str) -> Result<Option<ShortLink>> {
        self.repo.find_by_original_url(original_url.trim()).await
    }

    /// همه لینک‌ها، جدیدترین اول
    pub async fn list_all(&self) -> Result<Vec<ShortLink>> {
        self.repo.find_all().await
    }

    /// تعداد کل لینک‌ها
    pub async fn count(&self) -> Result<i64> {
        self.repo.count().await
    }
}

// =====================================
// Tests
// =====================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use pretty_assertions::{assert_eq, assert_ne};

    async fn registry() -> UrlRegistry {
        let db = Database::in_memory().await.unwrap();
        UrlRegistry::new(ShortLinkRepository::new(db), CodeGenerator::default())
    }

    #[tokio::test]
    async fn test_create_short_link() {
        let registry = registry().await;

        let link = registry.create_short_link("https://example.com/a").await.unwrap();

        assert_eq!(link.original_url, "https://example.com/a");
        assert_eq!(link.click_count, 0);
        assert_eq!(link.created_at, link.updated_at);
        assert!(ShortCode::parse(&link.short_code).is_some());
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected() {
        let registry = registry().await;

        for input in ["", "not a url", "example.com", "javascript:alert(1)", "http://"] {
            let result = registry.create_short_link(input).await;
            assert!(matches!(result, Err(AppError::InvalidUrl(_))), "{input}");
        }
        assert_eq!(registry.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_url() {
        let registry = registry().await;

        registry.create_short_link("https://example.com/a").await.unwrap();
        let second = registry.create_short_link("https://example.com/a").await;

        assert!(matches!(second, Err(AppError::DuplicateUrl(_))));
        assert_eq!(registry.count().await.unwrap(), 1);

        // مقایسه حساس به حروف هست
        registry.create_short_link("https://example.com/A").await.unwrap();
        assert_eq!(registry.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_surrounding_whitespace_is_trimmed() {
        let registry = registry().await;

        let link = registry.create_short_link("\thttps://x.com").await.unwrap();
        assert_eq!(link.original_url, "https://x.com");

        let link = registry.create_short_link("https://x.com/a\n").await.unwrap();
        assert_eq!(link.original_url, "https://x.com/a");

        // همون URL با فاصله اضافه تکراری حساب میشه
        let again = registry.create_short_link("  https://x.com/a").await;
        assert!(matches!(again, Err(AppError::DuplicateUrl(_))));
        assert_eq!(registry.count().await.unwrap(), 2);

        let inner = registry.create_short_link("https://x.com/a\nb").await;
        assert!(matches!(inner, Err(AppError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_seeded_rng_is_deterministic() {
        let registry = registry().await;
        let expected = CodeGenerator::draw(&mut StdRng::seed_from_u64(11));

        let link = registry
            .create_short_link_with_rng("https://example.com/a", &mut StdRng::seed_from_u64(11))
            .await
            .unwrap();

        assert_eq!(link.short_code, expected.as_str());
    }

    #[tokio::test]
    async fn test_stale_snapshot_retries_with_new_code() {
        let db = Database::in_memory().await.unwrap();
        let repo = ShortLinkRepository::new(db);
        let registry = UrlRegistry::new(repo.clone(), CodeGenerator::default());

        // اولین کدی که این seed میده رو یک نفر دیگه بعد از snapshot گرفته
        let rng = StdRng::seed_from_u64(99);
        let first_code = CodeGenerator::draw(&mut rng.clone());
        repo.insert(&NewShortLink::new("https://example.com/other", first_code.clone()))
            .await
            .unwrap();

        let link = registry
            .insert_with_retry("https://example.com/new", HashSet::new(), &mut rng.clone())
            .await
            .unwrap();

        assert_ne!(link.short_code, first_code.as_str());
        assert_eq!(link.original_url, "https://example.com/new");
        assert_eq!(registry.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_stale_snapshot_exhausts_attempts() {
        let db = Database::in_memory().await.unwrap();
        let repo = ShortLinkRepository::new(db);
        let registry = UrlRegistry::new(repo.clone(), CodeGenerator::new(1));

        let rng = StdRng::seed_from_u64(5);
        let first_code = CodeGenerator::draw(&mut rng.clone());
        repo.insert(&NewShortLink::new("https://example.com/other", first_code))
            .await
            .unwrap();

        let result = registry
            .insert_with_retry("https://example.com/new", HashSet::new(), &mut rng.clone())
            .await;

        assert!(matches!(result, Err(AppError::ExhaustedCodeSpace { attempts: 1 })));
        assert_eq!(registry.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_by_code_and_url() {
        let registry = registry().await;
        let link = registry.create_short_link("https://example.com/a").await.unwrap();

        let by_code = registry.find_by_code(&link.short_code).await.unwrap();
        let by_url = registry.find_by_original_url("https://example.com/a").await.unwrap();

        assert_eq!(by_code, Some(link.clone()));
        assert_eq!(by_url, Some(link));
        assert_eq!(registry.find_by_original_url("https://example.com/b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_by_malformed_code() {
        let registry = registry().await;

        assert_eq!(registry.find_by_code("").await.unwrap(), None);
        assert_eq!(registry.find_by_code("toolong").await.unwrap(), None);
        assert_eq!(registry.find_by_code("a-b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_all_newest_first() {
        let registry = registry().await;

        for i in 0..3 {
            registry
                .create_short_link(&format!("https://example.com/{i}"))
                .await
                .unwrap();
        }

        let urls: Vec<String> = registry
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|link| link.original_url)
            .collect();

        assert_eq!(
            urls,
            vec![
                "https://example.com/2".to_string(),
                "https://example.com/1".to_string(),
                "https://example.com/0".to_string(),
            ]
        );
    }
}
