//! # Metrics Handlers
//!
//! پنل آمار ماه جاری و آمار کلی

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;

use crate::{
    error::Result,
    models::{ApiResponse, MetricsPanelResponse, StatsResponse},
    services::AppState,
};

/// پنل آمار یک لینک برای ماه جاری (UTC)
///
/// # Endpoint
/// `GET /metric-panel/:code`
///
/// # Response
/// ```json
/// {
///   "success": true,
///   "data": {
///     "short_code": "aZ9",
///     "month": "October",
///     "daily_counts": [{ "day": "2024-10-01", "count": 3 }],
///     "agent_breakdown": [{ "browser": "Chrome", "platform": "Windows 10" }]
///   }
/// }
/// ```
pub async fn metric_panel(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<MetricsPanelResponse>>> {
    let now = Utc::now();
    let ctx = state.call_context();

    let report = ctx.run(state.metrics.summarize_month(&code, now)).await?;

    Ok(Json(ApiResponse::success(MetricsPanelResponse {
        short_code: code,
        month: now.format("%B").to_string(),
        report,
    })))
}

/// آمار کلی
///
/// # Endpoint
/// `GET /api/stats`
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<ApiResponse<StatsResponse>>> {
    let ctx = state.call_context();

    let total_links = ctx.run(state.registry.count()).await?;
    let total_clicks = ctx.run(state.metrics.total_clicks()).await?;

    Ok(Json(ApiResponse::success(StatsResponse {
        total_links,
        total_clicks,
    })))
}
