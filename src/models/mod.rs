//! # ماژول مدل‌ها (Domain Models)
//!
//! این ماژول مدل‌های داده برنامه رو تعریف میکنه.
//!
//! ## مفاهیم Rust:
//! - **Structs**: ساختار داده
//! - **Derive Macros**: تولید خودکار کد
//! - **FromRow**: تبدیل از ردیف دیتابیس
//! - **Serialize/Deserialize**: تبدیل JSON
//! - **Newtype Pattern**: کپسوله کردن نوع‌ها (`Id`، `ShortCode`)
//!
//! ## تفاوت انواع مدل:
//! - **Entity**: داده‌ای که در دیتابیس ذخیره میشه (`ShortLink`، `ClickEvent`)
//! - **New***: داده‌ای که برای insert به repository میره
//! - **DTO**: برای ارسال/دریافت از API

mod click;
mod dto;
mod metrics;
mod short_code;
mod short_link;

// Re-export همه مدل‌ها
pub use click::*;
pub use dto::*;
pub use metrics::*;
pub use short_code::*;
pub use short_link::*;

use serde::{Deserialize, Serialize};

// =====================================
// Common Types (Newtype Pattern)
// =====================================
/// شناسه یکتا
///
/// # Newtype Pattern
/// این الگو یه نوع ساده رو wrap میکنه برای:
/// - Type safety: جلوگیری از اشتباه
/// - پنهان کردن جزئیات
///
/// # مثال
/// ```rust
/// use shortlink_metrics::models::Id;
///
/// let id = Id::new();
/// assert_eq!(id.as_str().len(), 21);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    /// ساخت ID جدید
    #[must_use]
    pub fn new() -> Self {
        // استفاده از nanoid برای ID کوتاه و یکتا
        Self(nanoid::nanoid!(21))
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

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Id {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_generation() {
        let id1 = Id::new();
        let id2 = Id::new();

        assert_ne!(id1, id2);
        assert_eq!(id1.as_str().len(), 21);
    }
}
