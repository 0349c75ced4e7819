//! # API Configuration
//!
//! Server and storage settings for the lending API.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                            │
//! │     LENDING_PORT=9000                                                   │
//! │     LENDING_STORE=sqlite                                                │
//! │                                                                         │
//! │  2. TOML Config File                                                    │
//! │     $LENDING_CONFIG, or                                                 │
//! │     ~/.config/lending-tracker/lending.toml (Linux)                      │
//! │     ~/Library/Application Support/com.lending.tracker/lending.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                    │
//! │     127.0.0.1:8000, JSON files in the platform data dir                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # lending.toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8000
//!
//! [storage]
//! backend = "json"          # json | sqlite
//! data_dir = "/var/lib/lending"
//! database_path = "/var/lib/lending/lending.db"   # sqlite only, optional
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "LENDING_CONFIG";

/// Default SQLite file name inside the data directory.
pub const DEFAULT_DATABASE_FILE: &str = "lending.db";

// =============================================================================
// Errors
// =============================================================================

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Unknown store backend: '{0}'. Valid options: json, sqlite")]
    UnknownBackend(String),

    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// =============================================================================
// Store Backend
// =============================================================================

/// Which record store the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// `items.json` + `checkouts.json` in the data directory.
    #[default]
    Json,

    /// One SQLite database file.
    Sqlite,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Json => write!(f, "json"),
            StoreBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" | "file" | "files" => Ok(StoreBackend::Json),
            "sqlite" | "db" => Ok(StoreBackend::Sqlite),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

// =============================================================================
// Settings
// =============================================================================

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address (default: 127.0.0.1).
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Listen port (default: 8000).
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Directory holding the JSON files (and the default SQLite file).
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// SQLite file. Defaults to `<data_dir>/lending.db`.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "lending", "tracker")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./data"))
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            backend: StoreBackend::default(),
            data_dir: default_data_dir(),
            database_path: None,
        }
    }
}

impl StorageSettings {
    /// Returns the SQLite file path in effect.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DEFAULT_DATABASE_FILE))
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete API configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl ApiConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`$LENDING_CONFIG` or the platform config dir)
    /// 3. Environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .or_else(Self::default_config_path);

        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML config file. Missing sections take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_addr.trim().is_empty() {
            return Err(ConfigError::Invalid("bind_addr must not be empty".into()));
        }

        if self.storage.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data_dir must not be empty".into()));
        }

        Ok(())
    }

    /// Applies `LENDING_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from any key lookup (the process environment in
    /// production, a map in tests).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("LENDING_BIND_ADDR") {
            debug!(bind_addr = %addr, "Overriding bind address from environment");
            self.server.bind_addr = addr;
        }

        if let Some(port) = lookup("LENDING_PORT") {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "LENDING_PORT".into(),
                value: port.clone(),
            })?;
            debug!(port = self.server.port, "Overriding port from environment");
        }

        if let Some(backend) = lookup("LENDING_STORE") {
            self.storage.backend = backend.parse()?;
            debug!(backend = %self.storage.backend, "Overriding store backend from environment");
        }

        if let Some(dir) = lookup("LENDING_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }

        if let Some(path) = lookup("LENDING_DATABASE_PATH") {
            self.storage.database_path = Some(PathBuf::from(path));
        }

        Ok(())
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "lending", "tracker")
            .map(|dirs| dirs.config_dir().join("lending.toml"))
    }

    /// Returns `bind_addr:port`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.bind_addr, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!("json".parse::<StoreBackend>().unwrap(), StoreBackend::Json);
        assert_eq!("SQLite".parse::<StoreBackend>().unwrap(), StoreBackend::Sqlite);
        assert!(matches!(
            "postgres".parse::<StoreBackend>(),
            Err(ConfigError::UnknownBackend(_))
        ));
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.bind_address(), "127.0.0.1:8000");
        assert_eq!(config.storage.backend, StoreBackend::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ApiConfig::from_toml(
            r#"
            [storage]
            backend = "sqlite"
            data_dir = "/srv/lending"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.storage.backend, StoreBackend::Sqlite);
        assert_eq!(
            config.storage.database_path(),
            PathBuf::from("/srv/lending").join(DEFAULT_DATABASE_FILE)
        );
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = ApiConfig::from_toml("[server]\nport = 9000\n").unwrap();
        config
            .apply_overrides(lookup(&[
                ("LENDING_PORT", "9100"),
                ("LENDING_STORE", "sqlite"),
                ("LENDING_DATABASE_PATH", "/tmp/x.db"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.storage.backend, StoreBackend::Sqlite);
        assert_eq!(config.storage.database_path(), PathBuf::from("/tmp/x.db"));
    }

    #[test]
    fn test_bad_env_values_are_errors() {
        let mut config = ApiConfig::default();
        let err = config
            .apply_overrides(lookup(&[("LENDING_PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = config
            .apply_overrides(lookup(&[("LENDING_STORE", "redis")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBackend(_)));
    }

    #[test]
    fn test_validation() {
        let mut config = ApiConfig::default();
        config.server.bind_addr = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&ApiConfig::default()).unwrap();
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[storage]"));
        assert!(toml_str.contains("backend = \"json\""));
    }
}
