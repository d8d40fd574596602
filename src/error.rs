//! Error taxonomy for the reporting pipeline.
//!
//! An empty result set is not an error: the query layer returns an empty
//! `Vec`, the metrics reducer returns `None`, and the runner records the
//! period as having no data.

use std::path::PathBuf;
use thiserror::Error;

/// Maximum number of characters of SQL text carried in a [`QueryError`].
pub const QUERY_EXCERPT_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be a valid {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Failure establishing the database handle. Fatal for the whole run.
#[derive(Debug, Error)]
#[error("failed to connect to {target}: {source}")]
pub struct ConnectionError {
    /// `user@host:port/database`, never the password.
    pub target: String,
    #[source]
    pub source: sqlx::Error,
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("query rejected: {source} (query: {query})")]
    Rejected {
        query: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("query timed out after {seconds}s (query: {query})")]
    Timeout { query: String, seconds: u64 },
}

impl QueryError {
    pub fn rejected(sql: &str, source: sqlx::Error) -> Self {
        Self::Rejected {
            query: excerpt(sql),
            source,
        }
    }

    pub fn timeout(sql: &str, seconds: u64) -> Self {
        Self::Timeout {
            query: excerpt(sql),
            seconds,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode CSV for {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to encode CSV: {0}")]
    Encode(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("invalid reporting period: {year}-{month} (month must be 1-12)")]
    InvalidPeriod { year: i32, month: u32 },
}

/// Collapse whitespace and truncate SQL text for diagnostics.
fn excerpt(sql: &str) -> String {
    let flat = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > QUERY_EXCERPT_LEN {
        let cut: String = flat.chars().take(QUERY_EXCERPT_LEN).collect();
        format!("{}...", cut)
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_flattens_whitespace() {
        let err = QueryError::timeout("SELECT *\n    FROM fact_sales\n  WHERE 1", 30);
        match err {
            QueryError::Timeout { query, seconds } => {
                assert_eq!(query, "SELECT * FROM fact_sales WHERE 1");
                assert_eq!(seconds, 30);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_excerpt_truncates_long_queries() {
        let sql = "x ".repeat(500);
        let err = QueryError::rejected(&sql, sqlx::Error::RowNotFound);
        let QueryError::Rejected { query, .. } = err else {
            panic!("expected rejected");
        };
        assert!(query.ends_with("..."));
        assert_eq!(query.chars().count(), QUERY_EXCERPT_LEN + 3);
    }
}
