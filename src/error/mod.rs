//! # ماژول مدیریت خطاها (Error Handling)
//!
//! این ماژول سیستم مدیریت خطای برنامه رو تعریف میکنه.
//!
//! ## دسته‌بندی خطاها:
//! - **خطاهای قابل اصلاح توسط کاربر**: `InvalidUrl`، `DuplicateUrl`
//! - **نتیجه عادی**: `NotFound` (خطای سیستمی نیست، فقط "پیدا نشد")
//! - **خطاهای داخلی**: `ExhaustedCodeSpace`، خطاهای دیتابیس
//! - **خطای موقت دیتابیس**: `StoreConflict` که همیشه داخل سرویس‌ها retry میشه
//!
//! ## مفاهیم Rust:
//! - **thiserror**: derive macro برای Error trait
//! - **From Trait**: تبدیل خودکار نوع‌ها با `#[from]`
//! - **Result Type Alias**: alias برای ساده‌تر شدن کد

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

// =====================================
// Result Type Alias
// =====================================
/// نوع Result سفارشی برنامه
///
/// به جای نوشتن `Result<ShortLink, AppError>` میتونیم بنویسیم `Result<ShortLink>`
pub type Result<T, E = AppError> = std::result::Result<T, E>;

// =====================================
// Unique Field
// =====================================
/// ستونی که محدودیت یکتایی روش نقض شده
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    ShortCode,
    OriginalUrl,
}

impl std::fmt::Display for UniqueField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ShortCode => f.write_str("short_code"),
            Self::OriginalUrl => f.write_str("original_url"),
        }
    }
}

// =====================================
// Custom Error Enum
// =====================================
/// خطای اصلی برنامه
///
/// # مفاهیم:
/// - `#[derive(Error)]`: از thiserror برای پیاده‌سازی Error trait
/// - `#[error("...")]`: پیام خطا برای هر نوع
/// - `#[from]`: تبدیل خودکار از نوع‌های دیگه
#[derive(Debug, Error)]
pub enum AppError {
    // ----------------------------------------
    // خطاهای کاربر (4xx)
    // ----------------------------------------

    /// بدنه درخواست قابل parse نیست - 400
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// URL نامعتبر - 422
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// URL اصلی قبلا ثبت شده - 409
    #[error("Duplicate URL: {0}")]
    DuplicateUrl(String),

    /// پیدا نشد - 404
    #[error("Not found: {0}")]
    NotFound(String),

    // ----------------------------------------
    // خطاهای سرور (5xx)
    // ----------------------------------------

    /// فضای کدهای کوتاه تموم شده یا state خراب شده
    #[error("Exhausted short code space after {attempts} attempts")]
    ExhaustedCodeSpace { attempts: u32 },

    /// نقض محدودیت یکتایی در دیتابیس
    ///
    /// این خطا فقط داخل سرویس‌ها دیده میشه و همونجا retry یا
    /// به `DuplicateUrl` تبدیل میشه.
    #[error("Store conflict on {0}")]
    StoreConflict(UniqueField),

    /// مهلت عملیات تموم شد
    #[error("Operation timed out")]
    Timeout,

    /// عملیات توسط caller لغو شد
    #[error("Operation cancelled")]
    Cancelled,

    /// خطای داخلی سرور - 500
    #[error("Internal server error: {0}")]
    Internal(String),

    /// خطای سرور
    #[error("Server error: {0}")]
    Server(String),

    /// خطای تنظیمات
    #[error("Configuration error: {0}")]
    Config(String),

    // ----------------------------------------
    // خطاهای تبدیل شده از کتابخانه‌ها
    // ----------------------------------------

    /// خطای دیتابیس
    /// `#[from]` یعنی sqlx::Error خودکار به این تبدیل میشه
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// خطای migration
    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// خطای IO
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// گرفتن HTTP status code متناسب با خطا
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidUrl(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::DuplicateUrl(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,

            // 5xx Server Errors
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            Self::ExhaustedCodeSpace { .. }
            | Self::StoreConflict(_)
            | Self::Internal(_)
            | Self::Server(_)
            | Self::Config(_)
            | Self::Database(_)
            | Self::Migrate(_)
            | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// آیا این یه خطای سرور هست؟
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// ساخت خطای Not Found برای کد کوتاه
    #[must_use]
    pub fn link_not_found(short_code: &str) -> Self {
        Self::NotFound(format!("Short URL '{}' not found", short_code))
    }

    /// ساخت خطای تکراری برای URL اصلی
    #[must_use]
    pub fn duplicate_url(original_url: &str) -> Self {
        Self::DuplicateUrl(format!("The original URL '{}' already exists", original_url))
    }
}

// =====================================
// Error Response DTO
// =====================================
/// ساختار پاسخ خطا در API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// کد خطا (مثلا "Not Found")
    pub error: String,

    /// پیام خطا
    pub message: String,

    /// کد وضعیت HTTP
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl ErrorResponse {
    /// ساخت پاسخ خطای جدید
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status_code: None,
        }
    }

    /// اضافه کردن کد وضعیت
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status_code = Some(status.as_u16());
        self
    }
}

// =====================================
// IntoResponse Implementation
// =====================================
/// تبدیل AppError به Response HTTP
///
/// جزئیات خطاهای داخلی به کلاینت نمیرسه، فقط لاگ میشه.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if self.is_server_error() {
            error!(error = %self, "Server error occurred");
            status.canonical_reason().unwrap_or("Error").to_string()
        } else {
            self.to_string()
        };

        let error_response = ErrorResponse::new(
            status.canonical_reason().unwrap_or("Error"),
            message,
        )
        .with_status(status);

        (status, Json(error_response)).into_response()
    }
}

// =====================================
// From Implementations
// =====================================
impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

// تبدیل validator error
// تنها فیلد اعتبارسنجی شده در درخواست‌ها URL اصلی هست
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidUrl(err.to_string())
    }
}

// =====================================
// Option Extensions
// =====================================
/// Extension trait برای Option
pub trait OptionExt<T> {
    /// تبدیل None به AppError::NotFound
    fn ok_or_not_found(self, message: impl Into<String>) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, message: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| AppError::NotFound(message.into()))
    }
}

// =====================================
// Tests
// =====================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::InvalidUrl("test".to_string()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::DuplicateUrl("test".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::NotFound("test".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::ExhaustedCodeSpace { attempts: 3 }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(AppError::Timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(AppError::Cancelled.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            AppError::BadRequest("test".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_user_errors_are_not_server_errors() {
        assert!(!AppError::link_not_found("abc").is_server_error());
        assert!(!AppError::duplicate_url("https://example.com").is_server_error());
        assert!(AppError::StoreConflict(UniqueField::ShortCode).is_server_error());
    }

    #[test]
    fn test_error_response() {
        let response = ErrorResponse::new("Not Found", "Resource not found")
            .with_status(StatusCode::NOT_FOUND);

        assert_eq!(response.status_code, Some(404));
    }

    #[test]
    fn test_option_extension() {
        let some_value: Option<i32> = Some(42);
        let none_value: Option<i32> = None;

        assert!(some_value.ok_or_not_found("not found").is_ok());
        assert!(matches!(
            none_value.ok_or_not_found("not found"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_unique_field_display() {
        assert_eq!(UniqueField::ShortCode.to_string(), "short_code");
        assert_eq!(UniqueField::OriginalUrl.to_string(), "original_url");
    }
}
