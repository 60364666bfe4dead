//! Analytics HTTP surface (read side).

use std::sync::Arc;

use axum::{
    Extension,
    extract::{Query, State},
};
use chrono::{NaiveDate, TimeZone, Utc};
use serde::Deserialize;

use crate::auth::AuthenticatedUser;
use crate::gateway::{ApiError, ApiResult, ok};
use crate::state::AppState;

use super::models::{DailyMetric, HourlyMetric, MetricsSummary, UserAnalytics, UserSnapshot};
use super::service::AnalyticsService;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub period: Option<String>,
}

fn resolve_range(query: &RangeQuery) -> (NaiveDate, NaiveDate) {
    let (default_start, default_end) = AnalyticsService::default_range();
    (
        query.start_date.unwrap_or(default_start),
        query.end_date.unwrap_or(default_end),
    )
}

/// Daily metrics over a date range
///
/// GET /api/v1/analytics/daily
#[utoipa::path(
    get,
    path = "/api/v1/analytics/daily",
    responses((status = 200, description = "Daily metrics, newest first")),
    tag = "Analytics"
)]
pub async fn get_daily_metrics(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthenticatedUser>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Vec<DailyMetric>> {
    let service = state.analytics_service()?;
    let (start, end) = resolve_range(&query);
    match service.get_daily_metrics(start, end).await {
        Ok(metrics) => ok(metrics),
        Err(e) => ApiError::from(e).into_err(),
    }
}

/// Hourly metrics over a date range
///
/// GET /api/v1/analytics/hourly
#[utoipa::path(
    get,
    path = "/api/v1/analytics/hourly",
    responses((status = 200, description = "Hourly metrics, newest first")),
    tag = "Analytics"
)]
pub async fn get_hourly_metrics(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthenticatedUser>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Vec<HourlyMetric>> {
    let service = state.analytics_service()?;
    let (start, end) = resolve_range(&query);
    let start = Utc
        .from_utc_datetime(&start.and_hms_opt(0, 0, 0).expect("valid midnight"));
    let end = Utc.from_utc_datetime(&end.and_hms_opt(23, 59, 59).expect("valid end of day"));
    match service.get_hourly_metrics(start, end).await {
        Ok(metrics) => ok(metrics),
        Err(e) => ApiError::from(e).into_err(),
    }
}

/// Aggregated summary over a period
///
/// GET /api/v1/analytics/summary
#[utoipa::path(
    get,
    path = "/api/v1/analytics/summary",
    responses(
        (status = 200, description = "Range totals"),
        (status = 400, description = "Invalid period")
    ),
    tag = "Analytics"
)]
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthenticatedUser>,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<MetricsSummary> {
    let service = state.analytics_service()?;
    let (start, end) = resolve_range(&RangeQuery {
        start_date: query.start_date,
        end_date: query.end_date,
    });
    let period = query.period.as_deref().unwrap_or("daily");
    match service.get_metrics_summary(start, end, period).await {
        Ok(summary) => ok(summary),
        Err(e) => ApiError::from(e).into_err(),
    }
}

/// Per-user analytics for the authenticated user
///
/// GET /api/v1/analytics/me
#[utoipa::path(
    get,
    path = "/api/v1/analytics/me",
    responses((status = 200, description = "Totals for the caller over the range")),
    tag = "Analytics"
)]
pub async fn get_my_analytics(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<UserAnalytics> {
    let service = state.analytics_service()?;
    let (start, end) = resolve_range(&query);
    match service
        .get_user_analytics(&user.user_id.to_string(), start, end)
        .await
    {
        Ok(analytics) => ok(analytics),
        Err(e) => ApiError::from(e).into_err(),
    }
}

/// Per-user daily snapshots for the authenticated user
///
/// GET /api/v1/analytics/me/snapshots
#[utoipa::path(
    get,
    path = "/api/v1/analytics/me/snapshots",
    responses((status = 200, description = "Daily snapshots, newest first")),
    tag = "Analytics"
)]
pub async fn get_my_snapshots(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Vec<UserSnapshot>> {
    let service = state.analytics_service()?;
    let (start, end) = resolve_range(&query);
    match service
        .get_user_snapshots(&user.user_id.to_string(), start, end)
        .await
    {
        Ok(snapshots) => ok(snapshots),
        Err(e) => ApiError::from(e).into_err(),
    }
}
