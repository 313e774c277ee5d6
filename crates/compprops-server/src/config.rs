use anyhow::Context;
use compprops::pool::{DEFAULT_POOL_SIZE, parse_database_url};
use std::str::FromStr;
use std::time::Duration;
use tokio_postgres::config::Host;

const DEFAULT_PG_HOST: &str = "localhost";
const DEFAULT_PG_PORT: u16 = 5432;
const DEFAULT_PG_USER: &str = "postgres";
const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 30;

/// Process configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub pg: tokio_postgres::Config,
    /// TCP endpoint polled before connecting. `None` for Unix socket hosts.
    pub db_endpoint: Option<(String, u16)>,
    pub server_port: u16,
    pub pool_size: usize,
    pub wait_timeout: Duration,
    pub log_level: String,
    pub json_logs: bool,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which returns the value of a variable if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let pg = match non_empty(&lookup, "DATABASE_URL") {
            Some(url) => parse_database_url(&url).context("invalid DATABASE_URL")?,
            None => {
                let mut pg = tokio_postgres::Config::new();
                pg.host(non_empty(&lookup, "PGHOST").as_deref().unwrap_or(DEFAULT_PG_HOST));
                pg.port(parse_var(&lookup, "PGPORT", DEFAULT_PG_PORT)?);
                pg.user(non_empty(&lookup, "PGUSER").as_deref().unwrap_or(DEFAULT_PG_USER));
                if let Some(password) = lookup("PGPASSWORD") {
                    pg.password(password);
                }
                if let Some(dbname) = non_empty(&lookup, "PGDATABASE") {
                    pg.dbname(&dbname);
                }
                pg
            }
        };

        let db_endpoint = tcp_endpoint(&pg);

        Ok(Self {
            pg,
            db_endpoint,
            server_port: parse_var(&lookup, "SERVER_PORT", DEFAULT_SERVER_PORT)?,
            pool_size: parse_var(&lookup, "DB_POOL_SIZE", DEFAULT_POOL_SIZE)?,
            wait_timeout: Duration::from_secs(parse_var(
                &lookup,
                "DB_WAIT_TIMEOUT_SECS",
                DEFAULT_WAIT_TIMEOUT_SECS,
            )?),
            log_level: non_empty(&lookup, "LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            json_logs: lookup("JSON_LOGS")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(lookup, key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {key}={raw:?}: {e}")),
        None => Ok(default),
    }
}

fn tcp_endpoint(pg: &tokio_postgres::Config) -> Option<(String, u16)> {
    let host = match pg.get_hosts().first() {
        Some(Host::Tcp(host)) => host.clone(),
        Some(_) => return None,
        None => DEFAULT_PG_HOST.to_string(),
    };
    let port = pg.get_ports().first().copied().unwrap_or(DEFAULT_PG_PORT);
    Some((host, port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<ServerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.pool_size, 16);
        assert_eq!(config.wait_timeout, Duration::from_secs(30));
        assert_eq!(config.log_level, "info");
        assert!(!config.json_logs);
        assert_eq!(config.db_endpoint, Some(("localhost".to_string(), 5432)));
        assert_eq!(config.pg.get_user(), Some("postgres"));
        assert_eq!(config.pg.get_dbname(), None);
    }

    #[test]
    fn test_pg_variables() {
        let config = config(&[
            ("PGHOST", "db"),
            ("PGPORT", "6432"),
            ("PGUSER", "app"),
            ("PGPASSWORD", "secret"),
            ("PGDATABASE", "layout"),
            ("SERVER_PORT", "8080"),
            ("DB_POOL_SIZE", "4"),
            ("DB_WAIT_TIMEOUT_SECS", "5"),
            ("JSON_LOGS", "TRUE"),
        ])
        .unwrap();
        assert_eq!(config.db_endpoint, Some(("db".to_string(), 6432)));
        assert_eq!(config.pg.get_user(), Some("app"));
        assert_eq!(config.pg.get_password(), Some(&b"secret"[..]));
        assert_eq!(config.pg.get_dbname(), Some("layout"));
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.wait_timeout, Duration::from_secs(5));
        assert!(config.json_logs);
    }

    #[test]
    fn test_database_url_overrides_pg_variables() {
        let config = config(&[
            ("DATABASE_URL", "postgres://svc@pg.internal:7000/app"),
            ("PGHOST", "ignored"),
        ])
        .unwrap();
        assert_eq!(config.db_endpoint, Some(("pg.internal".to_string(), 7000)));
        assert_eq!(config.pg.get_user(), Some("svc"));
    }

    #[test]
    fn test_invalid_number_names_variable() {
        let err = config(&[("SERVER_PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("SERVER_PORT"), "{err}");

        let err = config(&[("PGPORT", "99999")]).unwrap_err();
        assert!(err.to_string().contains("PGPORT"), "{err}");
    }
}
