//! # لایه API
//!
//! این ماژول HTTP handlers و routing رو مدیریت میکنه.
//!
//! ## مفاهیم Rust + Axum:
//! - **Router**: تعریف مسیرها
//! - **Handler Functions**: پردازش request‌ها
//! - **Extractors**: استخراج داده از request
//! - **State**: اشتراک state بین handlers
//! - **Middleware**: پردازش قبل/بعد از handler
//! - **Tower**: زیرساخت middleware
//!
//! ## ساختار URL‌ها:
//! - `GET /` و `GET /api/urls` - لیست لینک‌ها
//! - `POST /api/urls` - ساخت لینک کوتاه
//! - `GET /api/stats` - آمار کلی
//! - `GET /:code` - ثبت کلیک و redirect به URL اصلی
//! - `GET /metric-panel/:code` - آمار ماه جاری
//! - `GET /health` - Health check

mod extractors;
mod handlers;
mod middleware;

pub use extractors::*;
pub use handlers::*;
pub use middleware::*;

use axum::{
    middleware as axum_middleware,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::services::AppState;

// =====================================
// Router Builder
// =====================================
/// ساخت Router اصلی برنامه
///
/// # مفاهیم:
/// - `Router::new()`: شروع router خالی
/// - `.route()`: اضافه کردن route
/// - `.nest()`: گروه‌بندی route‌ها
/// - `.layer()`: اضافه کردن middleware
/// - `.with_state()`: تزریق state
///
/// مسیرهای ثابت (`/health`) نسبت به `/:code` اولویت دارن.
pub fn create_router(state: AppState) -> Router {
    let timeout = state.config().request_timeout();

    Router::new()
        .route("/", get(handlers::links::list_links))
        .route("/:code", get(handlers::links::redirect))
        .route("/metric-panel/:code", get(handlers::metrics::metric_panel))
        .route("/health", get(handlers::health::health_check))
        .nest("/api", api_routes())
        .layer(
            ServiceBuilder::new()
                // Tracing - لاگ کردن request‌ها
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(request_id))
                .layer(axum_middleware::from_fn(request_timing))
                // Timeout - حداکثر زمان پردازش
                .layer(TimeoutLayer::new(timeout))
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}

/// Route‌های API
fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/urls",
            get(handlers::links::list_links).post(handlers::links::create_link),
        )
        .route("/stats", get(handlers::metrics::get_stats))
}
