//! Scalar summary metrics for one period of sales rows.

use serde::Serialize;
use std::collections::HashSet;

use crate::models::SalesRow;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyMetrics {
    pub total_revenue: f64,
    pub total_quantity: i64,
    pub avg_transaction_value: f64,
    pub unique_customers: usize,
    pub unique_products: usize,
    pub transaction_count: usize,
    pub total_discount: f64,
    pub discount_percentage: f64,
}

/// Reduce a period's rows to summary metrics.
///
/// Returns `None` for an empty slice so "no data" stays distinct from a
/// period whose totals happen to be zero. Customers and products are
/// counted by name.
pub fn compute_metrics(rows: &[SalesRow]) -> Option<MonthlyMetrics> {
    if rows.is_empty() {
        return None;
    }

    let mut total_revenue = 0.0;
    let mut total_quantity = 0;
    let mut total_discount = 0.0;
    let mut gross_sales = 0.0;
    let mut customers: HashSet<&str> = HashSet::new();
    let mut products: HashSet<&str> = HashSet::new();

    for row in rows {
        total_revenue += row.total_amount;
        total_quantity += row.quantity_sold;
        total_discount += row.discount;
        gross_sales += row.gross_amount();
        customers.insert(row.customer_name.as_str());
        products.insert(row.product_name.as_str());
    }

    let transaction_count = rows.len();
    let discount_percentage = if gross_sales > 0.0 {
        total_discount / gross_sales * 100.0
    } else {
        0.0
    };

    Some(MonthlyMetrics {
        total_revenue,
        total_quantity,
        avg_transaction_value: total_revenue / transaction_count as f64,
        unique_customers: customers.len(),
        unique_products: products.len(),
        transaction_count,
        total_discount,
        discount_percentage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{row, scenario_rows};

    #[test]
    fn test_empty_rows_yield_none() {
        assert_eq!(compute_metrics(&[]), None);
    }

    #[test]
    fn test_three_row_scenario() {
        let metrics = compute_metrics(&scenario_rows()).unwrap();
        assert_eq!(metrics.total_revenue, 85.0);
        assert_eq!(metrics.transaction_count, 3);
        assert_eq!(metrics.total_discount, 5.0);
        assert_eq!(metrics.total_quantity, 8);
        assert_eq!(metrics.unique_products, 3);
        assert!((metrics.avg_transaction_value - 85.0 / 3.0).abs() < 1e-9);
        // gross = 20 + 50 + 20
        assert!((metrics.discount_percentage - 5.0 / 90.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_gross_sales_gives_zero_discount_percentage() {
        let rows = vec![
            row("Gift Card", "Promo", 0, 25.0, 0.0, 0.0),
            row("Sticker", "Promo", 0, 1.0, 0.0, 0.0),
        ];
        let metrics = compute_metrics(&rows).unwrap();
        assert_eq!(metrics.discount_percentage, 0.0);
        assert_eq!(metrics.total_revenue, 0.0);
        assert_eq!(metrics.transaction_count, 2);
    }

    #[test]
    fn test_distinct_customers() {
        let mut rows = scenario_rows();
        rows[1].customer_name = rows[0].customer_name.clone();
        let metrics = compute_metrics(&rows).unwrap();
        assert_eq!(metrics.unique_customers, 2);
    }

    #[test]
    fn test_idempotent() {
        let rows = scenario_rows();
        assert_eq!(compute_metrics(&rows), compute_metrics(&rows));
    }
}
