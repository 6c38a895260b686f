//! # تولید کننده کد کوتاه (CodeGenerator)
//!
//! کد تصادفی با طول تصادفی ۱ تا ۵ از الفبای ۶۲ حرفی میسازه و تا وقتی
//! کدی خارج از مجموعه کدهای موجود پیدا نکنه ادامه میده.
//!
//! ## مفاهیم Rust:
//! - **Pure function**: تابع فقط به ورودی‌ها و منبع تصادفی بستگی داره
//! - **Generic over `Rng`**: منبع تصادفی از بیرون تزریق میشه، پس تست‌ها
//!   میتونن با `StdRng::seed_from_u64` قطعی باشن
//! - هیچ state سراسری نداره

use std::collections::HashSet;

use rand::Rng;
use tracing::error;

use crate::{
    config::DEFAULT_MAX_CODE_ATTEMPTS,
    error::{AppError, Result},
    models::{ShortCode, MAX_SHORT_CODE_LENGTH, MIN_SHORT_CODE_LENGTH, SHORT_CODE_ALPHABET},
};

/// تولید کننده کدهای کوتاه یکتا
#[derive(Debug, Clone, Copy)]
pub struct CodeGenerator {
    max_attempts: u32,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CODE_ATTEMPTS)
    }
}

impl CodeGenerator {
    /// ساخت generator با سقف تلاش
    ///
    /// سقف صفر به یک گرد میشه تا حداقل یک قرعه کشیده بشه.
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// سقف تلاش‌ها
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// یک قرعه: طول یکنواخت از {1..5} و هر کاراکتر یکنواخت از الفبا
    pub fn draw<R: Rng>(rng: &mut R) -> ShortCode {
        let length = rng.gen_range(MIN_SHORT_CODE_LENGTH..=MAX_SHORT_CODE_LENGTH);

        let bytes = (0..length)
            .map(|_| SHORT_CODE_ALPHABET[rng.gen_range(0..SHORT_CODE_ALPHABET.len())])
            .collect();

        ShortCode::from_alphabet_bytes(bytes)
    }

    /// پیدا کردن کدی که در `existing` نیست
    ///
    /// # Errors
    /// `ExhaustedCodeSpace` اگه بعد از `max_attempts` قرعه هنوز کد آزاد پیدا نشه
    pub fn allocate<R: Rng>(
        &self,
        rng: &mut R,
        existing: &HashSet<String>,
    ) -> Result<ShortCode> {
        for _ in 0..self.max_attempts {
            let code = Self::draw(rng);
            if !existing.contains(code.as_str()) {
                return Ok(code);
            }
        }

        error!(
            attempts = self.max_attempts,
            allocated = existing.len(),
            "Short code space exhausted"
        );
        Err(AppError::ExhaustedCodeSpace {
            attempts: self.max_attempts,
        })
    }
}
