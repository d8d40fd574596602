use sqlx::mysql::MySqlConnectOptions;
use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;

/// Database credentials and pool settings resolved from the environment.
///
/// Credential resolution stops here: the rest of the crate only sees
/// [`MySqlConnectOptions`] built from this value.
#[derive(Clone)]
pub struct DbConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub query_timeout: Duration,
}

impl DbConfig {
    /// Read `DB_USER`, `DB_PASSWORD`, `DB_HOST`, `DB_PORT`, `DB_NAME` plus
    /// the pool knobs `DB_MAX_CONNECTIONS`, `DB_ACQUIRE_TIMEOUT_SECS` and
    /// `QUERY_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let user = lookup("DB_USER").ok_or(ConfigError::Missing("DB_USER"))?;
        let password = lookup("DB_PASSWORD").unwrap_or_default();
        let host = lookup("DB_HOST").unwrap_or_else(|| "localhost".to_string());
        let port = parse_or(&lookup, "DB_PORT", "port number", 3306)?;
        let database = lookup("DB_NAME").unwrap_or_else(|| "sales".to_string());

        let max_connections = parse_positive(&lookup, "DB_MAX_CONNECTIONS", 5)?;
        let acquire_timeout_secs = parse_positive(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 5)?;
        let query_timeout_secs = parse_positive(&lookup, "QUERY_TIMEOUT_SECS", 30)?;

        Ok(DbConfig {
            user,
            password,
            host,
            port,
            database,
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
            query_timeout: Duration::from_secs(query_timeout_secs),
        })
    }

    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }

    /// Connection target for logs and errors, without the password.
    pub fn target(&self) -> String {
        format!("{}@{}:{}/{}", self.user, self.host, self.port, self.database)
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("query_timeout", &self.query_timeout)
            .finish()
    }
}

fn parse_or<F, T>(
    lookup: &F,
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, expected, value }),
        None => Ok(default),
    }
}

/// Like [`parse_or`], but zero is rejected.
fn parse_positive<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Default + PartialEq,
{
    let value = parse_or(lookup, name, "positive integer", default)?;
    if value == T::default() {
        return Err(ConfigError::Invalid {
            name,
            expected: "positive integer",
            value: "0".to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = DbConfig::from_lookup(lookup_from(&[("DB_USER", "analyst")])).unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 3306);
        assert_eq!(config.database, "sales");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.query_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_missing_user() {
        let err = DbConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DB_USER")));
    }

    #[test]
    fn test_invalid_port() {
        let err = DbConfig::from_lookup(lookup_from(&[("DB_USER", "a"), ("DB_PORT", "abc")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "DB_PORT", .. }));
    }

    #[test]
    fn test_zero_timeouts_and_pool_size_rejected() {
        for key in ["QUERY_TIMEOUT_SECS", "DB_ACQUIRE_TIMEOUT_SECS", "DB_MAX_CONNECTIONS"] {
            let err = DbConfig::from_lookup(lookup_from(&[("DB_USER", "a"), (key, "0")]))
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { name, .. } if name == key),
                "{key} accepted zero"
            );
        }
        let config =
            DbConfig::from_lookup(lookup_from(&[("DB_USER", "a"), ("QUERY_TIMEOUT_SECS", "5")]))
                .unwrap();
        assert_eq!(config.query_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_password_never_rendered() {
        let config = DbConfig::from_lookup(lookup_from(&[
            ("DB_USER", "analyst"),
            ("DB_PASSWORD", "hunter2"),
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "28196"),
        ]))
        .unwrap();
        assert!(!format!("{:?}", config).contains("hunter2"));
        assert_eq!(config.target(), "analyst@db.internal:28196/sales");
    }
}
