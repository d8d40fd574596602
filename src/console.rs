//! Console progress and summary output for report runs.

use crate::metrics::MonthlyMetrics;
use crate::models::Period;
use crate::reports::{AnnualOverview, CategorySummary, ProductSummary};
use crate::runner::{BatchSummary, PeriodStatus};

pub fn print_section_header(title: &str) {
    println!("\n{}", "═".repeat(60));
    println!("  {}", title);
    println!("{}", "═".repeat(60));
}

pub fn print_subsection(title: &str) {
    println!("\n{}", title);
    println!("{}", "─".repeat(50));
}

/// `$1,234.56`
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{}${}.{:02}",
        sign,
        group_thousands(cents / 100),
        cents % 100
    )
}

/// `$1.2M`, `$35K`, `$950`, for axis labels and tight columns.
pub fn format_compact_currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let value = amount.abs();
    let body = if value >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if value >= 1e3 {
        format!("{:.0}K", value / 1e3)
    } else {
        format!("{:.0}", value)
    };
    if body == "0" {
        "$0".to_string()
    } else {
        format!("{}${}", sign, body)
    }
}

/// `12,345`
pub fn format_count(value: i64) -> String {
    let grouped = group_thousands(value.unsigned_abs());
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn print_monthly_summary(metrics: &MonthlyMetrics) {
    print_subsection("Monthly Summary");
    println!("  Total Revenue:        {:>16}", format_currency(metrics.total_revenue));
    println!("  Total Items Sold:     {:>16}", format_count(metrics.total_quantity));
    println!("  Unique Customers:     {:>16}", format_count(metrics.unique_customers as i64));
    println!("  Total Transactions:   {:>16}", format_count(metrics.transaction_count as i64));
    println!("  Average Transaction:  {:>16}", format_currency(metrics.avg_transaction_value));
    println!("  Total Discount:       {:>16}", format_currency(metrics.total_discount));
    println!("  Discount Percentage:  {:>15.1}%", metrics.discount_percentage);
}

pub fn print_top_product(product: &ProductSummary) {
    println!("\n  Top Product:  {}", product.product_name);
    println!("     Revenue:   {}", format_currency(product.total_amount));
}

pub fn print_top_category(category: &CategorySummary) {
    println!("\n  Top Category: {}", category.category);
    println!("     Revenue:   {}", format_currency(category.total_revenue));
    println!("     Share:     {:.1}%", category.revenue_percentage);
}

pub fn print_annual_summary(overview: &AnnualOverview) {
    print_subsection(&format!("Annual Summary {}", overview.year));
    println!("  Total Revenue:        {:>16}", format_currency(overview.total_revenue));
    println!("  Total Items Sold:     {:>16}", format_count(overview.total_quantity_sold));
    println!("  Total Transactions:   {:>16}", format_count(overview.total_transactions));
    println!("  Customers (monthly):  {:>16}", format_count(overview.monthly_unique_customers));

    print_subsection("Monthly Performance");
    println!(
        "  Best Month:  {} ({})",
        overview.best_month.month_name,
        format_currency(overview.best_month.total_revenue)
    );
    println!(
        "  Worst Month: {} ({})",
        overview.worst_month.month_name,
        format_currency(overview.worst_month.total_revenue)
    );

    print_subsection("Monthly Revenue Breakdown");
    for share in &overview.month_shares {
        println!(
            "  {:12} {:>8} ({:5.1}%)",
            share.month_name,
            format_compact_currency(share.total_revenue),
            share.revenue_percentage
        );
    }
}

pub fn print_no_data(period: Period) {
    println!("\n  No sales data found for {}", period);
}

pub fn print_batch_summary(summary: &BatchSummary) {
    print_section_header("RUN SUMMARY");
    for outcome in &summary.outcomes {
        let line = match &outcome.status {
            PeriodStatus::Completed { artifacts } => {
                format!("ok       {} artifact(s)", artifacts.len())
            }
            PeriodStatus::Partial { artifacts, failures } => format!(
                "partial  {} written, {} failed: {}",
                artifacts.len(),
                failures.len(),
                failures
                    .iter()
                    .map(|f| format!("{} ({})", f.kind, f.error))
                    .collect::<Vec<_>>()
                    .join("; ")
            ),
            PeriodStatus::NoData => "no data".to_string(),
            PeriodStatus::Failed { error } => format!("FAILED   {}", error),
        };
        println!("  {:8} {}", outcome.period.to_string(), line);
    }
    println!("{}", "─".repeat(60));
    println!(
        "  {} completed, {} partial, {} without data, {} failed",
        summary.count(|s| matches!(s, PeriodStatus::Completed { .. })),
        summary.count(|s| matches!(s, PeriodStatus::Partial { .. })),
        summary.count(|s| matches!(s, PeriodStatus::NoData)),
        summary.count(|s| matches!(s, PeriodStatus::Failed { .. })),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(85.0), "$85.00");
        assert_eq!(format_currency(1234.567), "$1,234.57");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_currency(-42.5), "-$42.50");
    }

    #[test]
    fn test_format_compact_currency() {
        assert_eq!(format_compact_currency(1_240_000.0), "$1.2M");
        assert_eq!(format_compact_currency(35_400.0), "$35K");
        assert_eq!(format_compact_currency(950.0), "$950");
        assert_eq!(format_compact_currency(-500.0), "-$500");
        assert_eq!(format_compact_currency(-2_500_000.0), "-$2.5M");
        assert_eq!(format_compact_currency(-0.2), "$0");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(12_345), "12,345");
        assert_eq!(format_count(-1_000), "-1,000");
    }
}
