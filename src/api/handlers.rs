//! REST handlers for the sales dashboard.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use super::service::{AnnualView, DashboardService, MonthOverview};
use crate::error::ReportError;
use crate::reports::{CategorySummary, DailyRevenue, ProductSummary};

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

pub type AppState = Arc<DashboardService>;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn error_response(e: ReportError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e {
        ReportError::InvalidPeriod { .. } => StatusCode::BAD_REQUEST,
        _ => {
            error!("Dashboard request failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ErrorResponse { error: e.to_string() }))
}

/// GET /api/v1/health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// GET /api/v1/sales/:year/:month
pub async fn get_month(
    State(service): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> ApiResult<MonthOverview> {
    service.month_overview(year, month).await.map(Json).map_err(error_response)
}

/// GET /api/v1/sales/:year/:month/top-products
pub async fn get_top_products(
    State(service): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
    Query(params): Query<LimitQuery>,
) -> ApiResult<Vec<ProductSummary>> {
    let limit = params.limit.unwrap_or(10);
    service
        .top_products(year, month, limit)
        .await
        .map(Json)
        .map_err(error_response)
}

/// GET /api/v1/sales/:year/:month/categories
pub async fn get_categories(
    State(service): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> ApiResult<Vec<CategorySummary>> {
    service.categories(year, month).await.map(Json).map_err(error_response)
}

/// GET /api/v1/sales/:year/:month/daily
pub async fn get_daily(
    State(service): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> ApiResult<Vec<DailyRevenue>> {
    service.daily(year, month).await.map(Json).map_err(error_response)
}

/// GET /api/v1/sales/:year/:month/export.csv
pub async fn export_month(
    State(service): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let download = service.export_csv(year, month).await.map_err(error_response)?;
    let disposition = format!("attachment; filename=\"{}\"", download.filename);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    ))
}

/// GET /api/v1/annual/:year
pub async fn get_annual(
    State(service): State<AppState>,
    Path(year): Path<i32>,
) -> ApiResult<AnnualView> {
    service.annual(year).await.map(Json).map_err(error_response)
}
