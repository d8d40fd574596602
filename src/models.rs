use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ReportError;

/// One transaction line from `fact_sales` joined to its dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SalesRow {
    pub date: NaiveDate,
    pub customer_name: String,
    pub product_name: String,
    pub category: String,
    pub brand: String,
    pub quantity_sold: i64,
    pub unit_price: f64,
    pub discount: f64,
    pub total_amount: f64,
    pub store_name: String,
    pub store_city: String,
}

impl SalesRow {
    /// Quantity times list price, before discount.
    pub fn gross_amount(&self) -> f64 {
        self.quantity_sold as f64 * self.unit_price
    }
}

/// Server-side monthly aggregate for one month of a year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AnnualMonthRow {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub total_transactions: i64,
    pub unique_customers: i64,
    pub total_quantity_sold: i64,
    pub total_revenue: f64,
    pub avg_transaction_value: f64,
    pub total_discount: f64,
}

/// A reporting period: a whole year or a single month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Year(i32),
    Month { year: i32, month: u32 },
}

impl Period {
    pub fn month(year: i32, month: u32) -> Result<Self, ReportError> {
        if (1..=12).contains(&month) {
            Ok(Period::Month { year, month })
        } else {
            Err(ReportError::InvalidPeriod { year, month })
        }
    }

    pub fn year(&self) -> i32 {
        match *self {
            Period::Year(year) | Period::Month { year, .. } => year,
        }
    }

    /// `2024_05` for a month, `2024` for a year.
    pub fn file_suffix(&self) -> String {
        match *self {
            Period::Year(year) => format!("{}", year),
            Period::Month { year, month } => format!("{}_{:02}", year, month),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Period::Year(year) => write!(f, "{}", year),
            Period::Month { year, month } => write!(f, "{}-{:02}", year, month),
        }
    }
}

/// English month name for 1-12.
pub fn month_name(month: u32) -> Option<&'static str> {
    u8::try_from(month)
        .ok()
        .and_then(|m| chrono::Month::try_from(m).ok())
        .map(|m| m.name())
}
