//! Report orchestration: query, reduce, export, per period.
//!
//! A batch run records one [`PeriodOutcome`] per period and never stops
//! early; only the connection, established before the runner exists, can
//! abort a run.

use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::console;
use crate::error::ReportError;
use crate::export::{CsvRecord, ReportKind, ReportWriter};
use crate::metrics::compute_metrics;
use crate::models::Period;
use crate::query::SalesSource;
use crate::reports::{annual_overview, category_breakdown, monthly_trends, top_products};

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactFailure {
    pub kind: ReportKind,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PeriodStatus {
    Completed { artifacts: Vec<PathBuf> },
    /// Some artifacts were written, others failed.
    Partial {
        artifacts: Vec<PathBuf>,
        failures: Vec<ArtifactFailure>,
    },
    NoData,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeriodOutcome {
    pub period: Period,
    pub status: PeriodStatus,
}

/// Outcomes of a multi-period run, in the order the periods were run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub outcomes: Vec<PeriodOutcome>,
}

impl BatchSummary {
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&PeriodStatus) -> bool,
    {
        self.outcomes.iter().filter(|o| predicate(&o.status)).count()
    }

    pub fn failed_periods(&self) -> Vec<Period> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, PeriodStatus::Failed { .. } | PeriodStatus::Partial { .. }))
            .map(|o| o.period)
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        self.failed_periods().is_empty()
    }
}

#[derive(Default)]
struct ArtifactLog {
    artifacts: Vec<PathBuf>,
    failures: Vec<ArtifactFailure>,
}

impl ArtifactLog {
    fn into_status(self) -> PeriodStatus {
        if self.failures.is_empty() {
            PeriodStatus::Completed {
                artifacts: self.artifacts,
            }
        } else {
            PeriodStatus::Partial {
                artifacts: self.artifacts,
                failures: self.failures,
            }
        }
    }
}

pub struct ReportRunner<S> {
    source: S,
    writer: ReportWriter,
    top_n: usize,
}

impl<S: SalesSource> ReportRunner<S> {
    pub fn new(source: S, writer: ReportWriter) -> Self {
        Self {
            source,
            writer,
            top_n: DEFAULT_TOP_N,
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Detailed rows, top products, category share and metrics for one month.
    ///
    /// A failed query is returned as an error; a failed file write is
    /// recorded in the status and the remaining artifacts are still written.
    pub async fn monthly_report(&self, year: i32, month: u32) -> Result<PeriodStatus, ReportError> {
        let period = Period::month(year, month)?;
        console::print_section_header(&format!("Generating Report for {}", period));

        let rows = self.source.fetch_monthly_sales(year, month).await?;
        let Some(metrics) = compute_metrics(&rows) else {
            warn!("No sales data found for {}", period);
            console::print_no_data(period);
            return Ok(PeriodStatus::NoData);
        };
        console::print_monthly_summary(&metrics);

        let mut log = ArtifactLog::default();
        self.export(ReportKind::DetailedSales, period, &rows, &mut log);

        let products = top_products(&rows, self.top_n);
        if let Some(top) = products.first() {
            self.export(ReportKind::TopProducts, period, &products, &mut log);
            console::print_top_product(top);
        }

        let categories = category_breakdown(&rows);
        if let Some(top) = categories.first() {
            self.export(ReportKind::CategorySales, period, &categories, &mut log);
            console::print_top_category(top);
        }

        self.export(ReportKind::MetricsSummary, period, &[metrics], &mut log);

        Ok(log.into_status())
    }

    /// Monthly aggregates for a year, plus the derived trend table.
    pub async fn annual_report(&self, year: i32) -> Result<PeriodStatus, ReportError> {
        let period = Period::Year(year);
        console::print_section_header(&format!("ANNUAL SALES REPORT {}", year));

        let months = self.source.fetch_annual_sales(year).await?;
        let Some(overview) = annual_overview(year, &months) else {
            warn!("No sales data found for {}", year);
            console::print_no_data(period);
            return Ok(PeriodStatus::NoData);
        };
        console::print_annual_summary(&overview);

        let mut log = ArtifactLog::default();
        self.export(ReportKind::AnnualSummary, period, &months, &mut log);
        self.export(ReportKind::MonthlyTrends, period, &monthly_trends(&months), &mut log);

        Ok(log.into_status())
    }

    /// Run one period's report, turning any error into a failed outcome.
    pub async fn run_period(&self, period: Period) -> PeriodOutcome {
        let result = match period {
            Period::Year(year) => self.annual_report(year).await,
            Period::Month { year, month } => self.monthly_report(year, month).await,
        };
        let status = match result {
            Ok(status) => status,
            Err(e) => {
                error!("Report for {} failed: {}", period, e);
                PeriodStatus::Failed {
                    error: e.to_string(),
                }
            }
        };
        PeriodOutcome { period, status }
    }

    /// The annual report followed by each of the twelve monthly reports.
    pub async fn run_year(&self, year: i32) -> BatchSummary {
        let mut summary = BatchSummary::default();
        summary.outcomes.push(self.run_period(Period::Year(year)).await);

        console::print_section_header("GENERATING MONTHLY REPORTS");
        for month in 1..=12 {
            summary
                .outcomes
                .push(self.run_period(Period::Month { year, month }).await);
        }

        info!(
            "Finished {} periods for {}, {} with failures",
            summary.outcomes.len(),
            year,
            summary.failed_periods().len()
        );
        summary
    }

    fn export<T: CsvRecord>(&self, kind: ReportKind, period: Period, rows: &[T], log: &mut ArtifactLog) {
        match self.writer.write(kind, period, rows) {
            Ok(path) => {
                info!("Saved {}", path.display());
                log.artifacts.push(path);
            }
            Err(e) => {
                error!("Failed to export {} for {}: {}", kind, period, e);
                log.failures.push(ArtifactFailure {
                    kind,
                    error: e.to_string(),
                });
            }
        }
    }
}
