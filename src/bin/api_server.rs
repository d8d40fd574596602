//! Sales dashboard API server
//!
//! Usage:
//!   ./target/release/api_server [--port PORT]
//!
//! REST endpoints:
//!   GET /api/v1/health                              - Health check
//!   GET /api/v1/sales/:year/:month                  - Monthly metrics
//!   GET /api/v1/sales/:year/:month/top-products     - Top products (?limit=N)
//!   GET /api/v1/sales/:year/:month/categories       - Category revenue share
//!   GET /api/v1/sales/:year/:month/daily            - Daily revenue trend
//!   GET /api/v1/sales/:year/:month/export.csv       - Detailed rows as CSV
//!   GET /api/v1/annual/:year                        - Monthly aggregates and trend

use anyhow::Result;
use clap::Parser;
use sales_report::{
    api::{self, DashboardService},
    config::DbConfig,
    db::Database,
    query::SalesRepository,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "api_server")]
#[command(about = "Serve sales metrics and reports as JSON")]
struct Args {
    /// Port to listen on
    #[arg(long, default_value = "8080")]
    port: u16,
}

fn print_banner(port: u16) {
    println!("============================================================");
    println!("              SALES DASHBOARD API SERVER");
    println!("============================================================");
    println!();
    println!("  REST:     http://localhost:{}/api/v1/", port);
    println!();
    println!("Endpoints:");
    println!("  GET /api/v1/health                          Health check");
    println!("  GET /api/v1/sales/:y/:m                     Monthly metrics");
    println!("  GET /api/v1/sales/:y/:m/top-products        Top products");
    println!("  GET /api/v1/sales/:y/:m/categories          Category share");
    println!("  GET /api/v1/sales/:y/:m/daily               Daily trend");
    println!("  GET /api/v1/sales/:y/:m/export.csv          CSV download");
    println!("  GET /api/v1/annual/:y                       Annual view");
    println!("============================================================");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config = DbConfig::from_env()?;
    let db = Database::connect(&config).await?;
    let service = Arc::new(DashboardService::new(Arc::new(SalesRepository::new(&db))));

    print_banner(args.port);

    let addr: SocketAddr = format!("0.0.0.0:{}", args.port).parse()?;
    tracing::info!("Starting REST server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, api::router(service)).await?;

    db.close().await;
    Ok(())
}
