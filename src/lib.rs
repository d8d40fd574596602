//! Sales analytics reporting over a star-schema warehouse.
//!
//! Rows are fetched per month from `fact_sales` and its dimensions, reduced
//! into metrics and ranked tables, and exported as CSV or served as JSON.

pub mod api;
pub mod config;
pub mod console;
pub mod db;
pub mod error;
pub mod export;
pub mod metrics;
pub mod models;
pub mod query;
pub mod reports;
pub mod runner;

#[cfg(test)]
pub(crate) mod testing;
