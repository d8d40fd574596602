//! JSON dashboard API over the reporting pipeline.

pub mod handlers;
pub mod service;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use service::DashboardService;

pub fn router(service: Arc<DashboardService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(handlers::health))
        // Monthly views
        .route("/api/v1/sales/:year/:month", get(handlers::get_month))
        .route("/api/v1/sales/:year/:month/top-products", get(handlers::get_top_products))
        .route("/api/v1/sales/:year/:month/categories", get(handlers::get_categories))
        .route("/api/v1/sales/:year/:month/daily", get(handlers::get_daily))
        .route("/api/v1/sales/:year/:month/export.csv", get(handlers::export_month))
        // Annual view
        .route("/api/v1/annual/:year", get(handlers::get_annual))
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{scenario_rows, InMemorySource};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        let source = InMemorySource::default()
            .with_month(2024, 5, scenario_rows())
            .failing_month(2024, 6);
        router(Arc::new(DashboardService::new(Arc::new(source))))
    }

    async fn get(uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, _, body) = get(uri).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json("/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_month_overview() {
        let (status, body) = get_json("/api/v1/sales/2024/5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["period"], "2024-05");
        assert_eq!(body["row_count"], 3);
        assert_eq!(body["metrics"]["total_revenue"], 85.0);
    }

    #[tokio::test]
    async fn test_empty_month_has_null_metrics() {
        let (status, body) = get_json("/api/v1/sales/2024/7").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["row_count"], 0);
        assert!(body["metrics"].is_null());
    }

    #[tokio::test]
    async fn test_top_products_limit() {
        let (status, body) = get_json("/api/v1/sales/2024/5/top-products?limit=1").await;
        assert_eq!(status, StatusCode::OK);
        let products = body.as_array().unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0]["product_name"], "ProductB");
    }

    #[tokio::test]
    async fn test_categories() {
        let (_, body) = get_json("/api/v1/sales/2024/5/categories").await;
        assert_eq!(body[0]["category"], "Electronics");
        assert_eq!(body[1]["category"], "Clothing");
    }

    #[tokio::test]
    async fn test_invalid_month_is_bad_request() {
        let (status, body) = get_json("/api/v1/sales/2024/13").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("2024-13"));
    }

    #[tokio::test]
    async fn test_query_failure_is_server_error() {
        let (status, _) = get_json("/api/v1/sales/2024/6/daily").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_csv_download() {
        let (status, headers, body) = get("/api/v1/sales/2024/5/export.csv").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "text/csv; charset=utf-8");
        assert!(headers[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("sales_report_2024_05.csv"));
        let text = String::from_utf8(body).unwrap();
        assert!(text.starts_with("date,customer_name,"));
        assert_eq!(text.lines().count(), 4);
    }

    #[tokio::test]
    async fn test_csv_download_for_empty_month_has_header() {
        let (status, headers, body) = get("/api/v1/sales/2024/2/export.csv").await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("sales_report_2024_02.csv"));
        let text = String::from_utf8(body).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("date,customer_name,product_name,"));
    }

    #[tokio::test]
    async fn test_annual_view() {
        let (status, body) = get_json("/api/v1/annual/2024").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["months"].as_array().unwrap().len(), 1);
        assert_eq!(body["overview"]["best_month"]["month_name"], "May");
    }
}
