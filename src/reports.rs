//! Derived report tables built from sales rows or annual aggregates.
//!
//! Every builder is a pure function of its input and returns an empty
//! `Vec` (or `None`) for empty input.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::models::{AnnualMonthRow, SalesRow};

/// Revenue per distinct (product_name, category, brand).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSummary {
    pub product_name: String,
    pub category: String,
    pub brand: String,
    pub total_amount: f64,
    pub quantity_sold: i64,
    /// Unit price of the first row seen for this product, not an average.
    pub first_unit_price: f64,
    /// `total_amount / quantity_sold`; absent when nothing was sold.
    pub avg_selling_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub total_revenue: f64,
    pub transaction_count: usize,
    pub total_quantity: i64,
    pub revenue_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub total_revenue: f64,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrend {
    pub month: u32,
    pub month_name: String,
    pub total_revenue: f64,
    pub total_quantity_sold: i64,
    pub revenue_per_transaction: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthShare {
    pub month: u32,
    pub month_name: String,
    pub total_revenue: f64,
    pub revenue_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualOverview {
    pub year: i32,
    pub total_revenue: f64,
    pub total_quantity_sold: i64,
    pub total_transactions: i64,
    /// Sum of per-month distinct customers; a customer active in several
    /// months is counted once per month.
    pub monthly_unique_customers: i64,
    pub best_month: MonthShare,
    pub worst_month: MonthShare,
    pub month_shares: Vec<MonthShare>,
}

/// Top `n` products by revenue, ties broken by product name.
pub fn top_products(rows: &[SalesRow], n: usize) -> Vec<ProductSummary> {
    let mut index: HashMap<(&str, &str, &str), usize> = HashMap::new();
    let mut products: Vec<ProductSummary> = Vec::new();

    for row in rows {
        let key = (
            row.product_name.as_str(),
            row.category.as_str(),
            row.brand.as_str(),
        );
        let slot = *index.entry(key).or_insert_with(|| {
            products.push(ProductSummary {
                product_name: row.product_name.clone(),
                category: row.category.clone(),
                brand: row.brand.clone(),
                total_amount: 0.0,
                quantity_sold: 0,
                first_unit_price: row.unit_price,
                avg_selling_price: None,
            });
            products.len() - 1
        });
        let product = &mut products[slot];
        product.total_amount += row.total_amount;
        product.quantity_sold += row.quantity_sold;
    }

    for product in &mut products {
        product.avg_selling_price = if product.quantity_sold != 0 {
            Some(product.total_amount / product.quantity_sold as f64)
        } else {
            None
        };
    }

    products.sort_by(|a, b| {
        b.total_amount
            .total_cmp(&a.total_amount)
            .then_with(|| a.product_name.cmp(&b.product_name))
            .then_with(|| a.category.cmp(&b.category))
            .then_with(|| a.brand.cmp(&b.brand))
    });
    products.truncate(n);
    products
}

/// Revenue per category with its share of this result set's total.
pub fn category_breakdown(rows: &[SalesRow]) -> Vec<CategorySummary> {
    let mut groups: BTreeMap<&str, CategorySummary> = BTreeMap::new();

    for row in rows {
        let entry = groups
            .entry(row.category.as_str())
            .or_insert_with(|| CategorySummary {
                category: row.category.clone(),
                total_revenue: 0.0,
                transaction_count: 0,
                total_quantity: 0,
                revenue_percentage: 0.0,
            });
        entry.total_revenue += row.total_amount;
        entry.transaction_count += 1;
        entry.total_quantity += row.quantity_sold;
    }

    let mut categories: Vec<CategorySummary> = groups.into_values().collect();
    let grand_total: f64 = categories.iter().map(|c| c.total_revenue).sum();
    for category in &mut categories {
        category.revenue_percentage = percentage(category.total_revenue, grand_total);
    }

    // Stable sort keeps the BTreeMap's name order for equal revenue.
    categories.sort_by(|a, b| b.total_revenue.total_cmp(&a.total_revenue));
    categories
}

/// Revenue per calendar day, ascending by date.
pub fn daily_revenue(rows: &[SalesRow]) -> Vec<DailyRevenue> {
    let mut days: BTreeMap<NaiveDate, DailyRevenue> = BTreeMap::new();
    for row in rows {
        let day = days.entry(row.date).or_insert_with(|| DailyRevenue {
            date: row.date,
            total_revenue: 0.0,
            transaction_count: 0,
        });
        day.total_revenue += row.total_amount;
        day.transaction_count += 1;
    }
    days.into_values().collect()
}

pub fn monthly_trends(months: &[AnnualMonthRow]) -> Vec<MonthlyTrend> {
    months
        .iter()
        .map(|m| MonthlyTrend {
            month: m.month,
            month_name: m.month_name.clone(),
            total_revenue: m.total_revenue,
            total_quantity_sold: m.total_quantity_sold,
            revenue_per_transaction: (m.total_transactions > 0)
                .then(|| m.total_revenue / m.total_transactions as f64),
        })
        .collect()
}

/// Annual totals plus best and worst month by revenue.
///
/// Ties for best or worst go to the earliest month.
pub fn annual_overview(year: i32, months: &[AnnualMonthRow]) -> Option<AnnualOverview> {
    if months.is_empty() {
        return None;
    }

    let total_revenue: f64 = months.iter().map(|m| m.total_revenue).sum();
    let month_shares: Vec<MonthShare> = months
        .iter()
        .map(|m| MonthShare {
            month: m.month,
            month_name: m.month_name.clone(),
            total_revenue: m.total_revenue,
            revenue_percentage: percentage(m.total_revenue, total_revenue),
        })
        .collect();

    let mut chronological: Vec<&MonthShare> = month_shares.iter().collect();
    chronological.sort_by_key(|m| m.month);

    let mut best = chronological[0];
    let mut worst = chronological[0];
    for &share in &chronological[1..] {
        if share.total_revenue > best.total_revenue {
            best = share;
        }
        if share.total_revenue < worst.total_revenue {
            worst = share;
        }
    }
    let (best_month, worst_month) = (best.clone(), worst.clone());

    Some(AnnualOverview {
        year,
        total_revenue,
        total_quantity_sold: months.iter().map(|m| m.total_quantity_sold).sum(),
        total_transactions: months.iter().map(|m| m.total_transactions).sum(),
        monthly_unique_customers: months.iter().map(|m| m.unique_customers).sum(),
        best_month,
        worst_month,
        month_shares,
    })
}

fn percentage(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total * 100.0
    } else {
        0.0
    }
}
