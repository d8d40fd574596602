//! Read-only queries against the sales star schema.
//!
//! Year and month are always bound as parameters. DECIMAL and SUM results
//! are cast in SQL so rows decode into plain `f64`/`i64` fields.

use async_trait::async_trait;
use sqlx::mysql::MySqlPool;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::db::Database;
use crate::error::QueryError;
use crate::models::{AnnualMonthRow, SalesRow};

const MONTHLY_SALES_SQL: &str = r#"
    SELECT
        dd.date AS date,
        CONCAT(dc.first_name, ' ', dc.last_name) AS customer_name,
        dp.product_name,
        dp.category,
        dp.brand,
        CAST(fs.quantity_sold AS SIGNED) AS quantity_sold,
        CAST(fs.unit_price AS DOUBLE) AS unit_price,
        CAST(fs.discount AS DOUBLE) AS discount,
        CAST(fs.total_amount AS DOUBLE) AS total_amount,
        ds.store_name,
        ds.city AS store_city
    FROM fact_sales fs
    JOIN dim_date dd ON fs.date_key = dd.date_key
    JOIN dim_customer dc ON fs.customer_key = dc.customer_key
    JOIN dim_product dp ON fs.product_key = dp.product_key
    JOIN dim_store ds ON fs.store_key = ds.store_key
    WHERE dd.year = ? AND dd.month = ?
    ORDER BY dd.date, fs.sales_id
"#;

const ANNUAL_SALES_SQL: &str = r#"
    SELECT
        CAST(dd.year AS SIGNED) AS year,
        CAST(dd.month AS UNSIGNED) AS month,
        dd.month_name,
        COUNT(DISTINCT fs.sales_id) AS total_transactions,
        COUNT(DISTINCT fs.customer_key) AS unique_customers,
        CAST(SUM(fs.quantity_sold) AS SIGNED) AS total_quantity_sold,
        CAST(SUM(fs.total_amount) AS DOUBLE) AS total_revenue,
        CAST(AVG(fs.total_amount) AS DOUBLE) AS avg_transaction_value,
        CAST(SUM(fs.discount) AS DOUBLE) AS total_discount
    FROM fact_sales fs
    JOIN dim_date dd ON fs.date_key = dd.date_key
    WHERE dd.year = ?
    GROUP BY dd.year, dd.month, dd.month_name
    ORDER BY dd.month
"#;

/// Source of sales data for the report runner and the dashboard API.
#[async_trait]
pub trait SalesSource: Send + Sync {
    /// Every sales line of one month, ordered by date then sales id.
    /// A month without sales yields an empty `Vec`.
    async fn fetch_monthly_sales(&self, year: i32, month: u32) -> Result<Vec<SalesRow>, QueryError>;

    /// One aggregate row per month that has sales, ordered by month.
    async fn fetch_annual_sales(&self, year: i32) -> Result<Vec<AnnualMonthRow>, QueryError>;
}

/// [`SalesSource`] backed by the MySQL warehouse.
#[derive(Debug, Clone)]
pub struct SalesRepository {
    pool: MySqlPool,
    query_timeout: Duration,
}

impl SalesRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
            query_timeout: db.query_timeout(),
        }
    }

    async fn run<T, F>(&self, sql: &str, query: F) -> Result<T, QueryError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        with_timeout(self.query_timeout, sql, query).await
    }
}

/// Await a query for at most `limit`, mapping driver errors and expiry to
/// [`QueryError`] with an excerpt of `sql`.
pub async fn with_timeout<T, F>(limit: Duration, sql: &str, query: F) -> Result<T, QueryError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, query).await {
        Ok(Ok(rows)) => Ok(rows),
        Ok(Err(e)) => Err(QueryError::rejected(sql, e)),
        Err(_) => Err(QueryError::timeout(sql, limit.as_secs())),
    }
}

#[async_trait]
impl SalesSource for SalesRepository {
    async fn fetch_monthly_sales(&self, year: i32, month: u32) -> Result<Vec<SalesRow>, QueryError> {
        let query = sqlx::query_as::<_, SalesRow>(MONTHLY_SALES_SQL)
            .bind(year)
            .bind(month)
            .fetch_all(&self.pool);
        let rows = self.run(MONTHLY_SALES_SQL, query).await?;
        debug!("Fetched {} sales rows for {}-{:02}", rows.len(), year, month);
        Ok(rows)
    }

    async fn fetch_annual_sales(&self, year: i32) -> Result<Vec<AnnualMonthRow>, QueryError> {
        let query = sqlx::query_as::<_, AnnualMonthRow>(ANNUAL_SALES_SQL)
            .bind(year)
            .fetch_all(&self.pool);
        let rows = self.run(ANNUAL_SALES_SQL, query).await?;
        debug!("Fetched {} monthly aggregates for {}", rows.len(), year);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queries_use_placeholders() {
        assert_eq!(MONTHLY_SALES_SQL.matches('?').count(), 2);
        assert_eq!(ANNUAL_SALES_SQL.matches('?').count(), 1);
        assert!(MONTHLY_SALES_SQL.contains("ORDER BY dd.date, fs.sales_id"));
        assert!(ANNUAL_SALES_SQL.contains("GROUP BY dd.year, dd.month, dd.month_name"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_query_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(120)).await;
            Ok::<Vec<SalesRow>, sqlx::Error>(Vec::new())
        };
        let err = with_timeout(Duration::from_secs(30), MONTHLY_SALES_SQL, slow)
            .await
            .unwrap_err();
        match err {
            QueryError::Timeout { query, seconds } => {
                assert_eq!(seconds, 30);
                assert!(query.starts_with("SELECT dd.date AS date,"));
                assert!(query.chars().count() <= crate::error::QUERY_EXCERPT_LEN + 3);
            }
            other => panic!("expected timeout, got {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_within_limit_passes_through() {
        let quick = async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok::<u32, sqlx::Error>(7)
        };
        assert_eq!(with_timeout(Duration::from_secs(30), ANNUAL_SALES_SQL, quick).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_driver_error_is_rejected() {
        let failing = async { Err::<u32, _>(sqlx::Error::RowNotFound) };
        let err = with_timeout(Duration::from_secs(30), ANNUAL_SALES_SQL, failing)
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_in_memory_source_empty_month() {
        let source = crate::testing::InMemorySource::default();
        let rows = source.fetch_monthly_sales(2024, 2).await.unwrap();
        assert!(rows.is_empty());
        assert!(crate::metrics::compute_metrics(&rows).is_none());
    }
}
