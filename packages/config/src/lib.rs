// ABOUTME: Database configuration loaded from the environment
// ABOUTME: Parses SENTINEL_* variables with defaults suitable for a local install

pub mod constants;

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use constants::{
    SENTINEL_DATABASE_PATH, SENTINEL_DB_BUSY_TIMEOUT_SECS, SENTINEL_DB_ENABLE_WAL,
    SENTINEL_DB_MAX_CONNECTIONS,
};

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_BUSY_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub path: PathBuf,
    pub max_connections: u32,
    pub busy_timeout_seconds: u64,
    pub enable_wal: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: sentinel_core::database_file(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            busy_timeout_seconds: DEFAULT_BUSY_TIMEOUT_SECS,
            enable_wal: true,
        }
    }
}

impl DatabaseSettings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Load settings from an explicit variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut settings = Self::default();

        if let Some(path) = vars.get(SENTINEL_DATABASE_PATH).filter(|v| !v.is_empty()) {
            settings.path = PathBuf::from(path);
        }

        if let Some(raw) = vars.get(SENTINEL_DB_MAX_CONNECTIONS) {
            settings.max_connections = parse_value(SENTINEL_DB_MAX_CONNECTIONS, raw)?;
            if settings.max_connections == 0 {
                return Err(ConfigError::Zero(SENTINEL_DB_MAX_CONNECTIONS));
            }
        }

        if let Some(raw) = vars.get(SENTINEL_DB_BUSY_TIMEOUT_SECS) {
            settings.busy_timeout_seconds = parse_value(SENTINEL_DB_BUSY_TIMEOUT_SECS, raw)?;
        }

        if let Some(raw) = vars.get(SENTINEL_DB_ENABLE_WAL) {
            settings.enable_wal = parse_bool(SENTINEL_DB_ENABLE_WAL, raw)?;
        }

        debug!(
            "Database settings: path={} max_connections={} busy_timeout={}s wal={}",
            settings.path.display(),
            settings.max_connections,
            settings.busy_timeout_seconds,
            settings.enable_wal
        );

        Ok(settings)
    }
}

fn parse_value<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
        name,
        value: raw.to_string(),
    })
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = DatabaseSettings::from_vars(&HashMap::new()).unwrap();
        assert_eq!(settings.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(settings.busy_timeout_seconds, DEFAULT_BUSY_TIMEOUT_SECS);
        assert!(settings.enable_wal);
        assert!(settings.path.ends_with("sentinel.db"));
    }

    #[test]
    fn test_overrides() {
        let settings = DatabaseSettings::from_vars(&vars(&[
            (SENTINEL_DATABASE_PATH, "/var/lib/sentinel/db.sqlite"),
            (SENTINEL_DB_MAX_CONNECTIONS, "4"),
            (SENTINEL_DB_BUSY_TIMEOUT_SECS, "5"),
            (SENTINEL_DB_ENABLE_WAL, "off"),
        ]))
        .unwrap();

        assert_eq!(settings.path, PathBuf::from("/var/lib/sentinel/db.sqlite"));
        assert_eq!(settings.max_connections, 4);
        assert_eq!(settings.busy_timeout_seconds, 5);
        assert!(!settings.enable_wal);
    }

    #[test]
    fn test_invalid_values() {
        let err = DatabaseSettings::from_vars(&vars(&[(SENTINEL_DB_MAX_CONNECTIONS, "many")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                name: SENTINEL_DB_MAX_CONNECTIONS,
                value: "many".to_string()
            }
        );

        let err = DatabaseSettings::from_vars(&vars(&[(SENTINEL_DB_MAX_CONNECTIONS, "0")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Zero(SENTINEL_DB_MAX_CONNECTIONS));

        assert!(DatabaseSettings::from_vars(&vars(&[(SENTINEL_DB_ENABLE_WAL, "maybe")])).is_err());
    }
}
