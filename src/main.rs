//! # Shortlink Metrics - نقطه ورود برنامه
//!
//! این فایل نقطه شروع اجرای برنامه است.
//!
//! ## مفاهیم Rust در این فایل:
//! - `async fn main()`: تابع اصلی غیرهمزمان با tokio
//! - `?` operator: انتشار خطا به بالا
//! - Graceful shutdown: با Ctrl+C سرور درخواست‌های باز رو تموم میکنه

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use shortlink_metrics::{
    api::create_router,
    config::{Config, Environment},
    database::Database,
    error::{AppError, Result},
    services::AppState,
};

/// نقطه ورود اصلی برنامه
///
/// # Errors
/// خطا برمیگردونه اگه:
/// - تنظیمات لود نشن یا معتبر نباشن
/// - دیتابیس متصل نشه یا migration شکست بخوره
/// - سرور استارت نشه
#[tokio::main]
async fn main() -> Result<()> {
    // اگه فایل .env نباشه اوکیه
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.environment);

    info!("🚀 Starting Shortlink Metrics Service...");

    config.validate()?;
    info!(environment = ?config.environment, "✅ Configuration loaded successfully");

    let database = Database::connect(&config.database_url, config.max_connections).await?;
    info!("✅ Database connected successfully");

    database.migrate().await?;
    info!("✅ Database migrations applied");

    let addr = config.server_addr();
    let state = AppState::new(database, config);
    let shutdown = state.shutdown.clone();
    let app = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!("🌐 Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // لغو همه CallContext‌های باز
            shutdown.cancel();
        })
        .await
        .map_err(|e| AppError::Server(e.to_string()))?;

    info!("👋 Server stopped");
    Ok(())
}

/// منتظر Ctrl+C
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!(error = %e, "Failed to listen for shutdown signal"),
    }
}

/// راه‌اندازی سیستم tracing برای لاگینگ
///
/// # مفاهیم:
/// - Structured Logging: لاگ‌ها به صورت ساختاریافته ذخیره میشن
/// - Layers: لایه‌های مختلف برای فرمت و فیلتر کردن
/// - EnvFilter: فیلتر کردن لاگ‌ها بر اساس متغیر `RUST_LOG`
/// - در production خروجی JSON، در بقیه محیط‌ها فرمت pretty
fn init_tracing(environment: Environment) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("shortlink_metrics=debug,tower_http=debug"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if environment.is_production() {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_level(true)
                    .pretty(),
            )
            .init();
    }
}
