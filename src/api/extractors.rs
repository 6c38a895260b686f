//! # Custom Extractors
//!
//! Extractor‌های سفارشی برای استخراج داده از request
//!
//! ## مفاهیم Rust + Axum:
//! - **Extractors**: نوع‌هایی که از request داده استخراج میکنن
//! - **FromRequestParts**: برای header‌ها (بدون body)
//! - **FromRequest**: برای body
//! - **Rejection**: نوع خطا برای extractors
//!
//! ## چطور کار میکنه؟
//! وقتی یه extractor به عنوان پارامتر handler تعریف میشه،
//! axum قبل از اجرای handler، extractor رو اجرا میکنه.

use axum::{
    async_trait,
    body::Body,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts},
    http::{header, request::Parts, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;
use woothee::parser::Parser;

use crate::{
    error::AppError,
    models::{UserAgentInfo, UNKNOWN_AGENT},
};

/// مقداری که woothee برای فیلد ناشناخته برمیگردونه
const WOOTHEE_UNKNOWN: &str = "UNKNOWN";

// =====================================
// Client Agent Extractor
// =====================================
/// مرورگر و سیستم‌عامل کلاینت از header `User-Agent`
///
/// # مفاهیم:
/// - parse با `woothee`
/// - هر چیزی که تشخیص داده نشه `"Other"` میشه
/// - هیچوقت reject نمیکنه
///
/// # استفاده در handler:
/// ```rust,ignore
/// async fn handler(ClientAgent(agent): ClientAgent) -> ... {
///     // agent.browser, agent.platform
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ClientAgent(pub UserAgentInfo);

impl ClientAgent {
    /// parse یک رشته User-Agent خام
    #[must_use]
    pub fn parse(user_agent: &str) -> UserAgentInfo {
        let parser = Parser::new();
        let result = parser.parse(user_agent).unwrap_or_default();

        UserAgentInfo::new(known_or_other(result.name), known_or_other(result.os))
    }
}

fn known_or_other(value: &str) -> &str {
    if value.is_empty() || value == WOOTHEE_UNKNOWN {
        UNKNOWN_AGENT
    } else {
        value
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ClientAgent {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map_or_else(UserAgentInfo::unknown, Self::parse);

        Ok(ClientAgent(agent))
    }
}

// =====================================
// Request ID Extractor
// =====================================
/// استخراج یا تولید Request ID
///
/// # مفاهیم:
/// - برای tracing و لاگینگ
/// - میتونه از header بخونه یا جدید بسازه
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    /// Header name برای request ID
    pub const HEADER_NAME: &'static str = "x-request-id";
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequestId {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .headers
            .get(Self::HEADER_NAME)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
            .unwrap_or_else(|| nanoid::nanoid!(12));

        Ok(RequestId(request_id))
    }
}

// =====================================
// JSON with Validation
// =====================================
/// استخراج JSON با اعتبارسنجی خودکار
///
/// # مفاهیم:
/// - Validation در سطح extractor
/// - JSON خراب: 400، داده نامعتبر: 422
///
/// # استفاده:
/// ```rust,ignore
/// async fn handler(ValidatedJson(data): ValidatedJson<CreateShortLinkRequest>) -> ... {
///     // data حتما valid هست
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data): Json<T> = Json::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| AppError::BadRequest(format!("Invalid JSON: {}", e)))?;

        data.validate()?;

        Ok(ValidatedJson(data))
    }
}
