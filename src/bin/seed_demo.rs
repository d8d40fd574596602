//! Demo data seeder for the sales warehouse
//!
//! Creates the star schema if it is missing and fills it with randomized,
//! reproducible sales for one year.
//!
//! Usage:
//!   cargo run --release --bin seed_demo -- [OPTIONS]
//!
//! Options:
//!   --year <N>          Year to generate (default: 2024)
//!   --sales <N>         Number of fact rows (default: 5000)
//!   --customers <N>     Number of customers (default: 200)
//!   --discount-rate <F> Share of sales carrying a discount (default: 0.25)
//!   --seed <N>          Random seed for reproducibility (optional)
//!   --reset             Delete existing rows before seeding

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use clap::Parser;
use rand::prelude::*;
use rand::rngs::StdRng;
use sales_report::{
    config::DbConfig,
    db::{self, Database},
    models::month_name,
};
use tracing::{info, warn};

/// Seed the sales warehouse with demo data
#[derive(Parser, Debug)]
#[command(name = "seed_demo")]
#[command(about = "Generate demo sales data in the star schema")]
struct Args {
    /// Year to generate sales for
    #[arg(long, default_value = "2024")]
    year: i32,

    /// Number of fact_sales rows
    #[arg(long, default_value = "5000")]
    sales: usize,

    /// Number of customers
    #[arg(long, default_value = "200")]
    customers: usize,

    /// Probability that a sale carries a discount (0.0 - 1.0)
    #[arg(long, default_value = "0.25")]
    discount_rate: f64,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Delete existing rows before seeding
    #[arg(long)]
    reset: bool,
}

const FIRST_NAMES: &[&str] = &[
    "Mona", "Omar", "Sara", "Youssef", "Nour", "Karim", "Laila", "Hassan", "Mariam", "Adam",
    "Salma", "Ziad", "Hana", "Tarek", "Farida",
];

const LAST_NAMES: &[&str] = &[
    "Hanna", "Saleh", "Mansour", "Fahmy", "Nassar", "Khalil", "Aziz", "Ibrahim", "Gamal", "Fouad",
];

/// (product_name, category, brand, unit_price)
const PRODUCTS: &[(&str, &str, &str, f64)] = &[
    ("Laptop Pro 14", "Electronics", "Nimbus", 1299.00),
    ("Wireless Mouse", "Electronics", "Nimbus", 24.99),
    ("Noise Cancelling Headphones", "Electronics", "Sonora", 249.00),
    ("4K Monitor", "Electronics", "Vista", 379.00),
    ("Running Shoes", "Clothing", "Stride", 89.90),
    ("Denim Jacket", "Clothing", "Northline", 74.50),
    ("Cotton T-Shirt", "Clothing", "Northline", 14.99),
    ("Espresso Machine", "Home & Kitchen", "Brewhaus", 459.00),
    ("Chef Knife", "Home & Kitchen", "Edgeworth", 64.00),
    ("Non-stick Pan", "Home & Kitchen", "Edgeworth", 39.95),
    ("Yoga Mat", "Sports", "Stride", 29.00),
    ("Camping Tent", "Sports", "Trailhead", 199.00),
    ("Novel Paperback", "Books", "Inkwell", 12.99),
    ("Cookbook", "Books", "Inkwell", 32.00),
];

/// (store_name, city)
const STORES: &[(&str, &str)] = &[
    ("Downtown Flagship", "Cairo"),
    ("Harbor Mall", "Alexandria"),
    ("City Stars Outlet", "Cairo"),
    ("Nile Corniche", "Luxor"),
];

fn date_key(date: NaiveDate) -> i32 {
    date.year() * 10_000 + date.month() as i32 * 100 + date.day() as i32
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let config = DbConfig::from_env()?;
    let db = Database::connect(&config).await?;

    info!("Initializing schema...");
    db::init_schema(&db).await?;
    let pool = db.pool();

    if args.reset {
        warn!("Deleting existing warehouse rows");
        for table in ["fact_sales", "dim_date", "dim_customer", "dim_product", "dim_store"] {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(pool)
                .await?;
        }
    }

    // Date dimension: every day of the year
    info!("Inserting dates for {}...", args.year);
    let start = NaiveDate::from_ymd_opt(args.year, 1, 1)
        .ok_or_else(|| anyhow::anyhow!("invalid year {}", args.year))?;
    let dates: Vec<NaiveDate> = start
        .iter_days()
        .take_while(|d| d.year() == args.year)
        .collect();
    for date in &dates {
        sqlx::query(
            "INSERT IGNORE INTO dim_date (date_key, date, year, month, month_name) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(date_key(*date))
        .bind(*date)
        .bind(date.year())
        .bind(date.month())
        .bind(month_name(date.month()).unwrap_or_default())
        .execute(pool)
        .await?;
    }

    info!("Inserting {} customers...", args.customers);
    let mut customer_keys = Vec::with_capacity(args.customers);
    for _ in 0..args.customers {
        let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Guest");
        let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("Customer");
        let result = sqlx::query("INSERT INTO dim_customer (first_name, last_name) VALUES (?, ?)")
            .bind(first)
            .bind(last)
            .execute(pool)
            .await?;
        customer_keys.push(result.last_insert_id());
    }

    info!("Inserting {} products...", PRODUCTS.len());
    let mut product_keys = Vec::with_capacity(PRODUCTS.len());
    for (name, category, brand, price) in PRODUCTS {
        let result = sqlx::query(
            "INSERT INTO dim_product (product_name, category, brand, unit_price) VALUES (?, ?, ?, ?)",
        )
        .bind(*name)
        .bind(*category)
        .bind(*brand)
        .bind(*price)
        .execute(pool)
        .await?;
        product_keys.push((result.last_insert_id(), *price));
    }

    info!("Inserting {} stores...", STORES.len());
    let mut store_keys = Vec::with_capacity(STORES.len());
    for (name, city) in STORES {
        let result = sqlx::query("INSERT INTO dim_store (store_name, city) VALUES (?, ?)")
            .bind(*name)
            .bind(*city)
            .execute(pool)
            .await?;
        store_keys.push(result.last_insert_id());
    }

    info!("Inserting {} sales...", args.sales);
    let mut inserted = 0;
    for i in 0..args.sales {
        let (Some(date), Some(customer), Some((product, price)), Some(store)) = (
            dates.choose(&mut rng),
            customer_keys.choose(&mut rng),
            product_keys.choose(&mut rng),
            store_keys.choose(&mut rng),
        ) else {
            warn!("Nothing to sample from; skipping sales");
            break;
        };

        let quantity: i32 = rng.gen_range(1..=5);
        let gross = quantity as f64 * price;
        let discount = if rng.gen::<f64>() < args.discount_rate {
            (gross * rng.gen_range(0.05..0.20) * 100.0).round() / 100.0
        } else {
            0.0
        };
        let total = ((gross - discount) * 100.0).round() / 100.0;

        sqlx::query(
            r#"
            INSERT INTO fact_sales
                (date_key, customer_key, product_key, store_key, quantity_sold, unit_price, discount, total_amount)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(date_key(*date))
        .bind(*customer)
        .bind(*product)
        .bind(*store)
        .bind(quantity)
        .bind(*price)
        .bind(discount)
        .bind(total)
        .execute(pool)
        .await?;
        inserted += 1;

        if (i + 1) % 1000 == 0 {
            println!("   Inserted {}/{} sales...", i + 1, args.sales);
        }
    }

    db.close().await;

    println!("\nSeeding complete!");
    println!("Year:       {:>8}", args.year);
    println!("Dates:      {:>8}", dates.len());
    println!("Customers:  {:>8}", customer_keys.len());
    println!("Products:   {:>8}", product_keys.len());
    println!("Stores:     {:>8}", store_keys.len());
    println!("Sales:      {:>8}", inserted);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_key() {
        assert_eq!(date_key(NaiveDate::from_ymd_opt(2024, 5, 7).unwrap()), 20240507);
    }
}
