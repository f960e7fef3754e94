//! Reporting endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    services::reports::{BookSummary, ChartPoint, StatsDimension},
};

use super::{AuthenticatedAdmin, OkData};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookStatsQuery {
    pub dimension: String,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowTrendQuery {
    /// `YYYY-MM`
    pub start_date: Option<String>,
    /// `YYYY-MM`
    pub end_date: Option<String>,
}

/// Dashboard headline numbers
#[utoipa::path(
    get,
    path = "/report/summary",
    tag = "report",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Copy and category totals", body = BookSummary))
)]
pub async fn summary(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
) -> AppResult<Json<OkData<BookSummary>>> {
    let summary = state.services.reports.book_summary().await?;
    Ok(Json(OkData::new(summary)))
}

/// Copy counts grouped by category, status or publication year
#[utoipa::path(
    get,
    path = "/report/bookstats",
    tag = "report",
    security(("bearer_auth" = [])),
    params(
        ("dimension" = String, Query, description = "category | status | year"),
        ("startYear" = Option<i32>, Query, description = "Lower bound for the year dimension"),
        ("endYear" = Option<i32>, Query, description = "Upper bound for the year dimension")
    ),
    responses(
        (status = 200, description = "Chart slices", body = Vec<ChartPoint>),
        (status = 400, description = "Unsupported dimension")
    )
)]
pub async fn book_stats(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Query(query): Query<BookStatsQuery>,
) -> AppResult<Json<OkData<Vec<ChartPoint>>>> {
    let dimension = StatsDimension::parse(&query.dimension)?;
    let points = state
        .services
        .reports
        .book_stats(dimension, query.start_year, query.end_year)
        .await?;
    Ok(Json(OkData::new(points)))
}

/// Borrows per month over a date range
#[utoipa::path(
    get,
    path = "/report/borrowtrend",
    tag = "report",
    security(("bearer_auth" = [])),
    params(
        ("startDate" = Option<String>, Query, description = "First month, YYYY-MM"),
        ("endDate" = Option<String>, Query, description = "Last month, YYYY-MM")
    ),
    responses((status = 200, description = "Monthly borrow counts", body = Vec<ChartPoint>))
)]
pub async fn borrow_trend(
    State(state): State<crate::AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Query(query): Query<BorrowTrendQuery>,
) -> AppResult<Json<OkData<Vec<ChartPoint>>>> {
    let points = state
        .services
        .reports
        .borrow_trend(query.start_date.as_deref(), query.end_date.as_deref())
        .await?;
    Ok(Json(OkData::new(points)))
}
