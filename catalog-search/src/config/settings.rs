//! Environment-driven settings.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::AppError;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default PostgreSQL URL.
const DEFAULT_DATABASE_URL: &str = "postgres://localhost:5432/catalog";

/// Default index name prefix.
const DEFAULT_INDEX_PREFIX: &str = "catalog";

const DEFAULT_INDEX_TIMEOUT_MS: u64 = 800;
const DEFAULT_MAX_CANDIDATES: u32 = 1000;
const DEFAULT_SYNC_BATCH_SIZE: usize = 500;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_AVAILABILITY_CHECK_SECS: u64 = 30;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Settings read from the environment.
///
/// # Environment Variables
///
/// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
/// - `DATABASE_URL`: PostgreSQL connection string
/// - `INDEX_PREFIX`: prefix of the per-entity index names (default: catalog)
/// - `INDEX_TIMEOUT_MS`: budget of one index query before falling back (default: 800)
/// - `MAX_CANDIDATES`: candidate window for geo and popularity stages (default: 1000)
/// - `SYNC_BATCH_SIZE`: rows per resync batch (default: 500)
/// - `DB_MAX_CONNECTIONS`: PostgreSQL pool size (default: 10)
/// - `AVAILABILITY_CHECK_SECS`: availability monitor interval (default: 30)
/// - `RESYNC_ON_START`: resync every index when serving starts (default: true)
/// - `LOG_FORMAT`: `json` for structured logs, anything else for text
#[derive(Debug, Clone)]
pub struct Settings {
    pub opensearch_url: String,
    pub database_url: String,
    pub index_prefix: String,
    pub index_timeout: Duration,
    pub max_candidates: u32,
    pub sync_batch_size: usize,
    pub db_max_connections: u32,
    pub availability_check: Duration,
    pub resync_on_start: bool,
    pub log_format: LogFormat,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns a variable's value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let log_format = match lookup("LOG_FORMAT") {
            Some(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        let max_candidates: u32 = parse(&lookup, "MAX_CANDIDATES", DEFAULT_MAX_CANDIDATES)?;
        if max_candidates == 0 {
            return Err(AppError::config("MAX_CANDIDATES must be positive"));
        }

        Ok(Self {
            opensearch_url: string("OPENSEARCH_URL", DEFAULT_OPENSEARCH_URL),
            database_url: string("DATABASE_URL", DEFAULT_DATABASE_URL),
            index_prefix: string("INDEX_PREFIX", DEFAULT_INDEX_PREFIX),
            index_timeout: Duration::from_millis(parse(
                &lookup,
                "INDEX_TIMEOUT_MS",
                DEFAULT_INDEX_TIMEOUT_MS,
            )?),
            max_candidates,
            sync_batch_size: parse(&lookup, "SYNC_BATCH_SIZE", DEFAULT_SYNC_BATCH_SIZE)?,
            db_max_connections: parse(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            availability_check: Duration::from_secs(parse(
                &lookup,
                "AVAILABILITY_CHECK_SECS",
                DEFAULT_AVAILABILITY_CHECK_SECS,
            )?),
            resync_on_start: parse(&lookup, "RESYNC_ON_START", true)?,
            log_format,
        })
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError> {
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| AppError::config(format!("{} has an invalid value '{}'", key, value))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings(&[]).unwrap();
        assert_eq!(settings.opensearch_url, DEFAULT_OPENSEARCH_URL);
        assert_eq!(settings.index_prefix, "catalog");
        assert_eq!(settings.index_timeout, Duration::from_millis(800));
        assert_eq!(settings.max_candidates, 1000);
        assert_eq!(settings.sync_batch_size, 500);
        assert_eq!(settings.availability_check, Duration::from_secs(30));
        assert!(settings.resync_on_start);
        assert_eq!(settings.log_format, LogFormat::Text);
    }

    #[test]
    fn test_overrides() {
        let settings = settings(&[
            ("INDEX_TIMEOUT_MS", "250"),
            ("RESYNC_ON_START", "false"),
            ("LOG_FORMAT", "JSON"),
            ("INDEX_PREFIX", "staging"),
        ])
        .unwrap();
        assert_eq!(settings.index_timeout, Duration::from_millis(250));
        assert!(!settings.resync_on_start);
        assert_eq!(settings.log_format, LogFormat::Json);
        assert_eq!(settings.index_prefix, "staging");
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let err = settings(&[("SYNC_BATCH_SIZE", "lots")]).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(msg) if msg.contains("SYNC_BATCH_SIZE")));

        let err = settings(&[("MAX_CANDIDATES", "0")]).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
