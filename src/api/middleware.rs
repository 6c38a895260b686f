//! # Middleware
//!
//! Middleware‌های سفارشی برای پردازش request/response
//!
//! ## مفاهیم:
//! - **Middleware**: کد که قبل/بعد از handler اجرا میشه
//! - **Tower**: کتابخانه middleware در اکوسیستم Rust
//! - **`axum::middleware::from_fn`**: ساخت middleware از یک async fn

use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::{info, warn};

use super::RequestId;

// =====================================
// Request Timing Middleware
// =====================================
/// اندازه‌گیری زمان پردازش request
///
/// # مفاهیم:
/// - `Next`: ادامه زنجیره middleware
/// - `Instant`: اندازه‌گیری زمان
///
/// # استفاده:
/// ```rust,ignore
/// let app = Router::new()
///     .layer(axum::middleware::from_fn(request_timing));
/// ```
pub async fn request_timing(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed();

    if response.status().is_server_error() {
        warn!(
            method = %method,
            uri = %uri,
            status = %response.status(),
            duration_ms = %duration.as_millis(),
            "Request failed"
        );
    } else {
        info!(
            method = %method,
            uri = %uri,
            status = %response.status(),
            duration_ms = %duration.as_millis(),
            "Request completed"
        );
    }

    response
}

// =====================================
// Request ID Middleware
// =====================================
/// اضافه کردن Request ID به هر request و response
///
/// اگه کلاینت ID معتبر فرستاده باشه همون استفاده میشه،
/// وگرنه یک ID تازه ساخته میشه.
pub async fn request_id(mut request: Request<Body>, next: Next) -> Response {
    let header_value = request
        .headers()
        .get(RequestId::HEADER_NAME)
        .cloned()
        .unwrap_or_else(fresh_request_id);

    request
        .headers_mut()
        .insert(RequestId::HEADER_NAME, header_value.clone());

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(RequestId::HEADER_NAME, header_value);

    response
}

fn fresh_request_id() -> HeaderValue {
    // nanoid فقط از کاراکترهای URL-safe استفاده میکنه
    HeaderValue::from_str(&nanoid::nanoid!(12)).unwrap_or_else(|_| HeaderValue::from_static("unknown"))
}
