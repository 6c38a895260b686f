//! # Link Handlers
//!
//! Handler‌های ساخت، لیست و redirect لینک‌های کوتاه

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::{
    api::extractors::{ClientAgent, RequestId, ValidatedJson},
    error::{AppError, OptionExt, Result},
    models::{ApiResponse, ClickSummary, CreateShortLinkRequest, ShortLinkResponse},
    services::AppState,
};

// =====================================
// List Links
// =====================================
/// لیست همه لینک‌ها، جدیدترین اول
///
/// هر لینک کلیک‌هاش رو (زمان، مرورگر، سیستم‌عامل) زیر `metrics` داره.
///
/// # Endpoint
/// `GET /` و `GET /api/urls`
pub async fn list_links(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ShortLinkResponse>>>> {
    let ctx = state.call_context();
    let links = ctx.run(state.registry.list_all()).await?;
    let mut clicks = ctx.run(state.metrics.clicks_by_link()).await?;

    let base_url = &state.config().base_url;
    let responses = links
        .iter()
        .map(|link| {
            let metrics = clicks
                .remove(&link.id)
                .unwrap_or_default()
                .iter()
                .map(ClickSummary::from)
                .collect();
            ShortLinkResponse::from_link(link, base_url).with_metrics(metrics)
        })
        .collect();

    Ok(Json(ApiResponse::success(responses)))
}

// =====================================
// Create Short Link
// =====================================
/// ساخت لینک کوتاه جدید
///
/// # Endpoint
/// `POST /api/urls`
///
/// # Request Body
/// ```json
/// { "original_url": "https://example.com/long-url" }
/// ```
///
/// # Response
/// - 201 با لینک ساخته شده
/// - 422 اگه URL نامعتبر باشه
/// - 409 اگه URL قبلا ثبت شده باشه
pub async fn create_link(
    State(state): State<AppState>,
    request_id: RequestId,
    ValidatedJson(request): ValidatedJson<CreateShortLinkRequest>,
) -> Result<impl IntoResponse> {
    let ctx = state.call_context();
    let link = ctx
        .run(state.registry.create_short_link(&request.original_url))
        .await?;

    info!(request_id = %request_id.0, short_code = %link.short_code, "Short link created");

    let response = ShortLinkResponse::from_link(&link, &state.config().base_url);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(response).with_message("Short link created")),
    ))
}

// =====================================
// Redirect
// =====================================
/// ثبت کلیک و redirect به URL اصلی
///
/// # مفاهیم:
/// - `ClientAgent`: مرورگر و سیستم‌عامل از User-Agent
/// - 302 Found؛ `Redirect::temporary` در axum کد 307 میده
/// - هدر `Location` قبل از ثبت کلیک ساخته میشه تا کلیکی بدون redirect ثبت نشه
///
/// # Endpoint
/// `GET /:code`
pub async fn redirect(
    State(state): State<AppState>,
    Path(code): Path<String>,
    request_id: RequestId,
    ClientAgent(agent): ClientAgent,
) -> Result<Response> {
    let ctx = state.call_context();

    let link = ctx
        .run(state.registry.find_by_code(&code))
        .await?
        .ok_or_not_found(format!("Short URL '{}' not found", code))?;

    let location = HeaderValue::from_str(&link.original_url).map_err(|e| {
        AppError::Internal(format!("Stored URL for '{}' is not a valid header: {}", code, e))
    })?;

    ctx.run(state.clicks.record_click(&code, &agent.browser, &agent.platform))
        .await?;

    info!(
        request_id = %request_id.0,
        short_code = %code,
        browser = %agent.browser,
        platform = %agent.platform,
        "Redirecting"
    );

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
