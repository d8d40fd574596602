//! Shared fixtures for unit tests.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::error::QueryError;
use crate::models::{month_name, AnnualMonthRow, SalesRow};
use crate::query::SalesSource;

pub fn row(
    product: &str,
    category: &str,
    quantity: i64,
    unit_price: f64,
    discount: f64,
    total: f64,
) -> SalesRow {
    SalesRow {
        date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        customer_name: format!("Customer of {}", product),
        product_name: product.to_string(),
        category: category.to_string(),
        brand: "Generic".to_string(),
        quantity_sold: quantity,
        unit_price,
        discount,
        total_amount: total,
        store_name: "Downtown".to_string(),
        store_city: "Cairo".to_string(),
    }
}

/// ProductA/ProductB in Electronics, ProductC in Clothing; revenue 85.
pub fn scenario_rows() -> Vec<SalesRow> {
    vec![
        row("ProductA", "Electronics", 2, 10.0, 0.0, 20.0),
        row("ProductB", "Electronics", 1, 50.0, 5.0, 45.0),
        row("ProductC", "Clothing", 5, 4.0, 0.0, 20.0),
    ]
}

/// In-memory [`SalesSource`] keyed by (year, month).
///
/// Months listed in `failing` and years listed in `failing_years` return a
/// rejected query; every monthly call is recorded in `calls`.
#[derive(Default)]
pub struct InMemorySource {
    pub monthly: HashMap<(i32, u32), Vec<SalesRow>>,
    pub failing: HashSet<(i32, u32)>,
    pub failing_years: HashSet<i32>,
    pub calls: Mutex<Vec<(i32, u32)>>,
}

impl InMemorySource {
    pub fn with_month(mut self, year: i32, month: u32, rows: Vec<SalesRow>) -> Self {
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.date = NaiveDate::from_ymd_opt(year, month, r.date.day0() + 1)
                    .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 1).unwrap());
                r
            })
            .collect();
        self.monthly.insert((year, month), rows);
        self
    }

    pub fn failing_month(mut self, year: i32, month: u32) -> Self {
        self.failing.insert((year, month));
        self
    }

    pub fn failing_year(mut self, year: i32) -> Self {
        self.failing_years.insert(year);
        self
    }
}

#[async_trait]
impl SalesSource for InMemorySource {
    async fn fetch_monthly_sales(&self, year: i32, month: u32) -> Result<Vec<SalesRow>, QueryError> {
        self.calls.lock().unwrap().push((year, month));
        if self.failing.contains(&(year, month)) {
            return Err(QueryError::rejected(
                "SELECT ... FROM fact_sales",
                sqlx::Error::Protocol("connection reset".to_string()),
            ));
        }
        Ok(self.monthly.get(&(year, month)).cloned().unwrap_or_default())
    }

    async fn fetch_annual_sales(&self, year: i32) -> Result<Vec<AnnualMonthRow>, QueryError> {
        if self.failing_years.contains(&year) {
            return Err(QueryError::timeout("SELECT ... GROUP BY dd.month", 30));
        }
        let mut months: Vec<u32> = self
            .monthly
            .keys()
            .filter(|(y, _)| *y == year)
            .map(|(_, m)| *m)
            .collect();
        months.sort_unstable();

        Ok(months
            .into_iter()
            .filter_map(|month| {
                let rows = &self.monthly[&(year, month)];
                if rows.is_empty() {
                    return None;
                }
                let customers: HashSet<&str> =
                    rows.iter().map(|r| r.customer_name.as_str()).collect();
                let revenue: f64 = rows.iter().map(|r| r.total_amount).sum();
                Some(AnnualMonthRow {
                    year,
                    month,
                    month_name: month_name(month).unwrap_or("").to_string(),
                    total_transactions: rows.len() as i64,
                    unique_customers: customers.len() as i64,
                    total_quantity_sold: rows.iter().map(|r| r.quantity_sold).sum(),
                    total_revenue: revenue,
                    avg_transaction_value: revenue / rows.len() as f64,
                    total_discount: rows.iter().map(|r| r.discount).sum(),
                })
            })
            .collect())
    }
}
