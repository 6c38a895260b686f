//! # کد کوتاه (Short Code)
//!
//! Newtype برای کدهای کوتاه: ۱ تا ۵ کاراکتر از الفبای ۶۲ حرفی `[A-Za-z0-9]`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// کاراکترهای مجاز برای short code
pub const SHORT_CODE_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// حداقل طول short code
pub const MIN_SHORT_CODE_LENGTH: usize = 1;

/// حداکثر طول short code
pub const MAX_SHORT_CODE_LENGTH: usize = 5;

/// الگوی معتبر برای short code
///
/// # مفاهیم:
/// - `Lazy`: مقداردهی اولیه در اولین استفاده
pub static VALID_SHORT_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9]{1,5}$").expect("Invalid regex pattern")
});

/// کد کوتاه معتبر
///
/// فقط از طریق `ShortCode::parse` یا `CodeGenerator` ساخته میشه،
/// پس هر مقدار این نوع طول و الفبای درست داره.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortCode(String);

impl ShortCode {
    /// ساخت از string با اعتبارسنجی
    ///
    /// # مثال
    /// ```rust
    /// use shortlink_metrics::models::ShortCode;
    ///
    /// assert!(ShortCode::parse("aZ9").is_some());
    /// assert!(ShortCode::parse("toolong").is_none());
    /// assert!(ShortCode::parse("a-b").is_none());
    /// ```
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        VALID_SHORT_CODE
            .is_match(code)
            .then(|| Self(code.to_string()))
    }

    /// ساخت از بایت‌های الفبا (فقط برای generator)
    pub(crate) fn from_alphabet_bytes(bytes: Vec<u8>) -> Self {
        debug_assert!(bytes.iter().all(|b| SHORT_CODE_ALPHABET.contains(b)));
        // همه بایت‌ها ASCII هستن
        Self(bytes.into_iter().map(char::from).collect())
    }

    /// گرفتن به عنوان &str
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// تبدیل به String
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShortCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_has_62_unique_symbols() {
        let unique: std::collections::HashSet<_> = SHORT_CODE_ALPHABET.iter().collect();
        assert_eq!(SHORT_CODE_ALPHABET.len(), 62);
        assert_eq!(unique.len(), 62);
    }

    #[test]
    fn test_parse() {
        assert!(ShortCode::parse("a").is_some());
        assert!(ShortCode::parse("AbC12").is_some());
        assert!(ShortCode::parse("").is_none());
        assert!(ShortCode::parse("abcdef").is_none());
        assert!(ShortCode::parse("ab_c").is_none());
        assert!(ShortCode::parse("ab c").is_none());
        assert!(ShortCode::parse("R4nd0m").is_none());
    }

    #[test]
    fn test_parse_is_case_sensitive_identity() {
        let lower = ShortCode::parse("abc").unwrap();
        let upper = ShortCode::parse("ABC").unwrap();
        assert_ne!(lower, upper);
        assert_eq!(lower.as_str(), "abc");
    }
}
