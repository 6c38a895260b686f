//! # ماژول توابع کمکی (Utilities)
//!
//! این ماژول توابع و ثابت‌های کمکی رو ارائه میده.
//!
//! ## محتوا:
//! - اعتبارسنجی URL اصلی (با `url` crate)
//! - محاسبه بازه ماه تقویمی برای گزارش‌ها
//!
//! ## سیاست منطقه زمانی
//! همه محاسبات روز و ماه در **UTC** انجام میشن. هم فیلتر بازه و هم
//! گرد کردن به روز با یک منطقه زمانی انجام میشه.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

// =====================================
// Constants
// =====================================
/// حداکثر طول URL اصلی
pub const MAX_URL_LENGTH: usize = 2048;

/// scheme‌های مجاز برای URL اصلی
pub const ALLOWED_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps"];

// =====================================
// Validation Functions
// =====================================
/// اعتبارسنجی و نرمال‌سازی URL اصلی
///
/// # مفاهیم:
/// - `Result<String, String>`: شکل ذخیره‌شدنی URL یا پیام خطا برای کاربر
/// - فاصله‌های ابتدا و انتها حذف میشن
/// - کاراکتر کنترلی یا فاصله داخل URL رد میشه؛ `Url::parse` این‌ها رو
///   بی‌صدا حذف میکنه ولی داخل هدر `Location` معتبر نیستن
/// - URL باید absolute باشه: scheme و host داشته باشه
///
/// # مثال
/// ```rust
/// use shortlink_metrics::utils::normalize_url;
///
/// assert_eq!(normalize_url(" https://example.com/a\n").unwrap(), "https://example.com/a");
/// assert!(normalize_url("https://example.com/a\nb").is_err());
/// ```
pub fn normalize_url(url_str: &str) -> Result<String, String> {
    let trimmed = url_str.trim();

    if trimmed.is_empty() {
        return Err("The original URL is required".to_string());
    }

    if trimmed.len() > MAX_URL_LENGTH {
        return Err(format!(
            "The original URL is longer than {} characters",
            MAX_URL_LENGTH
        ));
    }

    if trimmed.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err("The original URL must not contain whitespace or control characters".to_string());
    }

    let url = url::Url::parse(trimmed)
        .map_err(|e| format!("The original URL is not valid: {}", e))?;

    if !ALLOWED_SCHEMES.contains(&url.scheme()) {
        return Err(format!(
            "The original URL scheme '{}' is not supported",
            url.scheme()
        ));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(trimmed.to_string()),
        _ => Err("The original URL must contain a host".to_string()),
    }
}

/// اعتبارسنجی URL با دلیل خوانا
///
/// # مثال
/// ```rust
/// use shortlink_metrics::utils::validate_url;
///
/// assert!(validate_url("https://example.com/a").is_ok());
/// assert!(validate_url("this.is.an.invalid_url").is_err());
/// ```
pub fn validate_url(url_str: &str) -> Result<(), String> {
    normalize_url(url_str).map(|_| ())
}

/// نسخه bool از `validate_url`
#[must_use]
pub fn is_valid_url(url_str: &str) -> bool {
    validate_url(url_str).is_ok()
}

// =====================================
// Time Utilities
// =====================================
/// اولین لحظه ماهی که `now` داخلشه
#[must_use]
pub fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    first_instant_of(now.year(), now.month())
}

/// آخرین لحظه ماهی که `now` داخلشه
///
/// یک نانوثانیه قبل از شروع ماه بعد، چون بازه‌ها inclusive هستن.
#[must_use]
pub fn end_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };

    first_instant_of(year, month) - Duration::nanoseconds(1)
}

/// بازه کامل ماه تقویمی `now`
#[must_use]
pub fn month_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (start_of_month(now), end_of_month(now))
}

fn first_instant_of(year: i32, month: u32) -> DateTime<Utc> {
    // روز اول هر ماه همیشه معتبره، MIN_UTC فقط برای سال‌های خارج از محدوده chrono
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

// =====================================
// Tests
// =====================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_url() {
        assert!(is_valid_url("https://example.com"));
        assert!(is_valid_url("http://example.com/path?q=1"));
        assert!(is_valid_url("ftp://files.example.com/a.txt"));
        assert!(!is_valid_url("mailto:someone@example.com"));
        assert!(!is_valid_url("not a url"));
        assert!(!is_valid_url("this.is.an.invalid_url"));
        assert!(!is_valid_url(""));
    }

    #[test]
    fn test_validate_url_reason() {
        let reason = validate_url("example.com").unwrap_err();
        assert!(reason.contains("not valid"));

        let long = format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH));
        assert!(validate_url(&long).unwrap_err().contains("longer"));
    }

    #[test]
    fn test_normalize_url_trims_surrounding_whitespace() {
        assert_eq!(normalize_url("\thttps://x.com").unwrap(), "https://x.com");
        assert_eq!(normalize_url("https://x.com/a\n").unwrap(), "https://x.com/a");
        assert_eq!(normalize_url("  https://x.com/a  ").unwrap(), "https://x.com/a");
    }

    #[test]
    fn test_normalize_url_rejects_inner_control_characters() {
        for input in ["https://x.com/a\nb", "https://x\t.com", "https://x.com/a b", "https://x.com/\u{7f}"] {
            assert!(normalize_url(input).is_err(), "{input:?}");
        }
    }

    #[test]
    fn test_month_window() {
        let now = Utc.with_ymd_and_hms(2024, 2, 15, 10, 30, 0).unwrap();
        let (start, end) = month_window(now);

        assert_eq!(start, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(end.date_naive(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(
            end + Duration::nanoseconds(1),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_month_window_december() {
        let now = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        let (start, end) = month_window(now);

        assert_eq!(start, Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(
            end + Duration::nanoseconds(1),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
    }
}
