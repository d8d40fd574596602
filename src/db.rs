use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::time::Duration;
use tracing::info;

use crate::config::DbConfig;
use crate::error::{ConnectionError, QueryError};

/// Explicit handle to the sales warehouse.
///
/// Created once by the caller and passed to the query layer; nothing in the
/// crate opens a connection on its own.
#[derive(Debug, Clone)]
pub struct Database {
    pool: MySqlPool,
    query_timeout: Duration,
}

impl Database {
    /// Open the pool and verify that a connection can be acquired.
    pub async fn connect(config: &DbConfig) -> Result<Self, ConnectionError> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(config.connect_options())
            .await
            .map_err(|source| ConnectionError {
                target: config.target(),
                source,
            })?;

        info!("Connected to {}", config.target());
        Ok(Self {
            pool,
            query_timeout: config.query_timeout,
        })
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS dim_date (
        date_key INT PRIMARY KEY,
        date DATE NOT NULL,
        year INT NOT NULL,
        month INT NOT NULL,
        month_name VARCHAR(16) NOT NULL,
        INDEX idx_dim_date_year_month (year, month)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS dim_customer (
        customer_key INT AUTO_INCREMENT PRIMARY KEY,
        first_name VARCHAR(64) NOT NULL,
        last_name VARCHAR(64) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS dim_product (
        product_key INT AUTO_INCREMENT PRIMARY KEY,
        product_name VARCHAR(128) NOT NULL,
        category VARCHAR(64) NOT NULL,
        brand VARCHAR(64) NOT NULL,
        unit_price DECIMAL(10, 2) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS dim_store (
        store_key INT AUTO_INCREMENT PRIMARY KEY,
        store_name VARCHAR(128) NOT NULL,
        city VARCHAR(64) NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS fact_sales (
        sales_id BIGINT AUTO_INCREMENT PRIMARY KEY,
        date_key INT NOT NULL,
        customer_key INT NOT NULL,
        product_key INT NOT NULL,
        store_key INT NOT NULL,
        quantity_sold INT NOT NULL,
        unit_price DECIMAL(10, 2) NOT NULL,
        discount DECIMAL(10, 2) NOT NULL DEFAULT 0,
        total_amount DECIMAL(12, 2) NOT NULL,
        FOREIGN KEY (date_key) REFERENCES dim_date (date_key),
        FOREIGN KEY (customer_key) REFERENCES dim_customer (customer_key),
        FOREIGN KEY (product_key) REFERENCES dim_product (product_key),
        FOREIGN KEY (store_key) REFERENCES dim_store (store_key)
    )
    "#,
];

/// Create the star schema if it does not exist yet.
pub async fn init_schema(db: &Database) -> Result<(), QueryError> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(db.pool())
            .await
            .map_err(|e| QueryError::rejected(statement, e))?;
    }
    Ok(())
}
