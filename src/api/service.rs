//! Shared logic behind the dashboard endpoints.
//!
//! Everything here is a function of (year, month) over the public query,
//! metrics and report operations.

use serde::Serialize;
use std::sync::Arc;

use crate::error::ReportError;
use crate::export::to_csv_bytes;
use crate::metrics::{compute_metrics, MonthlyMetrics};
use crate::models::{AnnualMonthRow, Period, SalesRow};
use crate::query::SalesSource;
use crate::reports::{
    annual_overview, category_breakdown, daily_revenue, monthly_trends, top_products,
    AnnualOverview, CategorySummary, DailyRevenue, MonthlyTrend, ProductSummary,
};

#[derive(Debug, Clone, Serialize)]
pub struct MonthOverview {
    pub period: String,
    pub row_count: usize,
    pub metrics: Option<MonthlyMetrics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnnualView {
    pub year: i32,
    pub months: Vec<AnnualMonthRow>,
    pub trends: Vec<MonthlyTrend>,
    pub overview: Option<AnnualOverview>,
}

pub struct CsvDownload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub struct DashboardService {
    source: Arc<dyn SalesSource>,
}

impl DashboardService {
    pub fn new(source: Arc<dyn SalesSource>) -> Self {
        Self { source }
    }

    async fn rows(&self, year: i32, month: u32) -> Result<(Period, Vec<SalesRow>), ReportError> {
        let period = Period::month(year, month)?;
        let rows = self.source.fetch_monthly_sales(year, month).await?;
        Ok((period, rows))
    }

    pub async fn month_overview(&self, year: i32, month: u32) -> Result<MonthOverview, ReportError> {
        let (period, rows) = self.rows(year, month).await?;
        Ok(MonthOverview {
            period: period.to_string(),
            row_count: rows.len(),
            metrics: compute_metrics(&rows),
        })
    }

    pub async fn top_products(
        &self,
        year: i32,
        month: u32,
        limit: usize,
    ) -> Result<Vec<ProductSummary>, ReportError> {
        let (_, rows) = self.rows(year, month).await?;
        Ok(top_products(&rows, limit))
    }

    pub async fn categories(&self, year: i32, month: u32) -> Result<Vec<CategorySummary>, ReportError> {
        let (_, rows) = self.rows(year, month).await?;
        Ok(category_breakdown(&rows))
    }

    pub async fn daily(&self, year: i32, month: u32) -> Result<Vec<DailyRevenue>, ReportError> {
        let (_, rows) = self.rows(year, month).await?;
        Ok(daily_revenue(&rows))
    }

    pub async fn export_csv(&self, year: i32, month: u32) -> Result<CsvDownload, ReportError> {
        let (period, rows) = self.rows(year, month).await?;
        Ok(CsvDownload {
            filename: format!("sales_report_{}.csv", period.file_suffix()),
            bytes: to_csv_bytes(&rows)?,
        })
    }

    pub async fn annual(&self, year: i32) -> Result<AnnualView, ReportError> {
        let months = self.source.fetch_annual_sales(year).await?;
        Ok(AnnualView {
            year,
            trends: monthly_trends(&months),
            overview: annual_overview(year, &months),
            months,
        })
    }
}
