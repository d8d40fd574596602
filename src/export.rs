//! CSV export sink for report artifacts.

use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::debug;

use crate::error::ExportError;
use crate::metrics::MonthlyMetrics;
use crate::models::{AnnualMonthRow, Period, SalesRow};
use crate::reports::{CategorySummary, MonthlyTrend, ProductSummary};

/// A row type that can be exported, with its header in field order.
///
/// The header is written even when there are no rows, so an empty period
/// still yields a file that names its columns.
pub trait CsvRecord: Serialize {
    const HEADERS: &'static [&'static str];
}

impl CsvRecord for SalesRow {
    const HEADERS: &'static [&'static str] = &[
        "date",
        "customer_name",
        "product_name",
        "category",
        "brand",
        "quantity_sold",
        "unit_price",
        "discount",
        "total_amount",
        "store_name",
        "store_city",
    ];
}

impl CsvRecord for ProductSummary {
    const HEADERS: &'static [&'static str] = &[
        "product_name",
        "category",
        "brand",
        "total_amount",
        "quantity_sold",
        "first_unit_price",
        "avg_selling_price",
    ];
}

impl CsvRecord for CategorySummary {
    const HEADERS: &'static [&'static str] = &[
        "category",
        "total_revenue",
        "transaction_count",
        "total_quantity",
        "revenue_percentage",
    ];
}

impl CsvRecord for MonthlyMetrics {
    const HEADERS: &'static [&'static str] = &[
        "total_revenue",
        "total_quantity",
        "avg_transaction_value",
        "unique_customers",
        "unique_products",
        "transaction_count",
        "total_discount",
        "discount_percentage",
    ];
}

impl CsvRecord for AnnualMonthRow {
    const HEADERS: &'static [&'static str] = &[
        "year",
        "month",
        "month_name",
        "total_transactions",
        "unique_customers",
        "total_quantity_sold",
        "total_revenue",
        "avg_transaction_value",
        "total_discount",
    ];
}

impl CsvRecord for MonthlyTrend {
    const HEADERS: &'static [&'static str] = &[
        "month",
        "month_name",
        "total_revenue",
        "total_quantity_sold",
        "revenue_per_transaction",
    ];
}

/// Kind of exported artifact; the first component of its filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    DetailedSales,
    TopProducts,
    CategorySales,
    MetricsSummary,
    AnnualSummary,
    MonthlyTrends,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::DetailedSales => "detailed_sales",
            ReportKind::TopProducts => "top_products",
            ReportKind::CategorySales => "category_sales",
            ReportKind::MetricsSummary => "metrics_summary",
            ReportKind::AnnualSummary => "annual_summary",
            ReportKind::MonthlyTrends => "monthly_trends",
        }
    }

    /// `top_products_2024_05.csv`, `annual_summary_2024.csv`
    pub fn filename(&self, period: Period) -> String {
        format!("{}_{}.csv", self.as_str(), period.file_suffix())
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writes report tables as CSV files under one directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write `rows` to `<dir>/<kind>_<period>.csv`, creating the directory
    /// on first use. The header row comes from [`CsvRecord::HEADERS`].
    pub fn write<T: CsvRecord>(
        &self,
        kind: ReportKind,
        period: Period,
        rows: &[T],
    ) -> Result<PathBuf, ExportError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|source| ExportError::Io {
                path: self.dir.clone(),
                source,
            })?;
            debug!("Created reports directory {}", self.dir.display());
        }

        let path = self.dir.join(kind.filename(period));
        let csv_err = |source: csv::Error| ExportError::Csv {
            path: path.clone(),
            source,
        };

        let mut writer = WriterBuilder::new()
            .has_headers(true)
            .from_path(&path)
            .map_err(csv_err)?;
        write_rows(&mut writer, rows).map_err(csv_err)?;
        writer.flush().map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }
}

/// Encode rows as CSV in memory, for download responses.
pub fn to_csv_bytes<T: CsvRecord>(rows: &[T]) -> Result<Vec<u8>, ExportError> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(Vec::new());
    write_rows(&mut writer, rows)?;
    writer
        .into_inner()
        .map_err(|e| ExportError::Encode(csv::Error::from(e.into_error())))
}

fn write_rows<W: io::Write, T: CsvRecord>(writer: &mut Writer<W>, rows: &[T]) -> Result<(), csv::Error> {
    if rows.is_empty() {
        writer.write_record(T::HEADERS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    Ok(())
}
