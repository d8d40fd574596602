//! Sales report generator
//!
//! Usage:
//!   sales_report [--reports-dir DIR] [--top-n N] <command>
//!
//! Commands:
//!   monthly --year Y --month M   One month: detailed rows, top products,
//!                                category share, metrics summary
//!   annual --year Y              Monthly aggregates and trend table
//!   batch --year Y               Annual report plus all twelve months
//!
//! Database credentials come from DB_USER, DB_PASSWORD, DB_HOST, DB_PORT and
//! DB_NAME (a .env file is read if present).

use anyhow::{bail, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use sales_report::{
    config::DbConfig,
    console,
    db::Database,
    export::ReportWriter,
    models::Period,
    query::SalesRepository,
    runner::{BatchSummary, ReportRunner, DEFAULT_TOP_N},
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "sales_report")]
#[command(about = "Generate monthly and annual sales reports as CSV")]
struct Args {
    /// Directory the CSV artifacts are written to
    #[arg(long, default_value = "reports", global = true)]
    reports_dir: PathBuf,

    /// Number of products in the top products report
    #[arg(long, default_value_t = DEFAULT_TOP_N, global = true)]
    top_n: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report for a single month
    Monthly {
        #[arg(long)]
        year: i32,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,
    },
    /// Annual summary from monthly aggregates
    Annual {
        #[arg(long)]
        year: i32,
    },
    /// Annual summary followed by every monthly report of the year
    Batch {
        #[arg(long)]
        year: i32,
    },
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

    println!("Starting Sales Report Generator");
    println!("Date: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));

    let config = DbConfig::from_env()?;
    info!("Connecting to {}", config.target());
    let db = Database::connect(&config).await?;

    let runner = ReportRunner::new(SalesRepository::new(&db), ReportWriter::new(&args.reports_dir))
        .with_top_n(args.top_n);

    let summary = match args.command {
        Command::Monthly { year, month } => BatchSummary {
            outcomes: vec![runner.run_period(Period::month(year, month)?).await],
        },
        Command::Annual { year } => BatchSummary {
            outcomes: vec![runner.run_period(Period::Year(year)).await],
        },
        Command::Batch { year } => runner.run_year(year).await,
    };

    db.close().await;

    console::print_batch_summary(&summary);
    println!("Reports directory: {}", args.reports_dir.display());

    let failed = summary.failed_periods();
    if !failed.is_empty() {
        let periods: Vec<String> = failed.iter().map(|p| p.to_string()).collect();
        bail!("{} period(s) did not complete: {}", failed.len(), periods.join(", "));
    }
    Ok(())
}
