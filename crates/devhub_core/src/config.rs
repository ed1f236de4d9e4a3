//! Process configuration resolved from environment variables.
//!
//! # Responsibility
//! - Pick the snapshot backend and data path.
//! - Resolve logging level and optional log directory.
//! - Construct the persistence adapter once and hand it to the store.
//!
//! # Invariants
//! - Blank variables are treated as unset.
//! - Resolution never touches the file system; only `open_store` does.

use crate::logging::{default_log_level, init_logging, normalize_level};
use crate::repo::json_repo::JsonFileSnapshotRepository;
use crate::repo::snapshot_repo::SnapshotRepository;
use crate::repo::sqlite_repo::SqliteSnapshotRepository;
use crate::service::project_store::{ProjectStore, StoreResult};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_STORE: &str = "DEVHUB_STORE";
pub const ENV_DATA_PATH: &str = "DEVHUB_DATA_PATH";
pub const ENV_LOG_LEVEL: &str = "DEVHUB_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "DEVHUB_LOG_DIR";

const DEFAULT_JSON_PATH: &str = "data/projects.json";
const DEFAULT_SQLITE_PATH: &str = "data/devhub.sqlite3";

/// Snapshot backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// One pretty-printed JSON array file.
    Json,
    /// One row per project in a SQLite table.
    Sqlite,
}

impl StoreBackend {
    fn default_path(self) -> PathBuf {
        match self {
            Self::Json => PathBuf::from(DEFAULT_JSON_PATH),
            Self::Sqlite => PathBuf::from(DEFAULT_SQLITE_PATH),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `DEVHUB_STORE` is neither `json` nor `sqlite`.
    UnknownBackend(String),
    /// `DEVHUB_LOG_LEVEL` is not a supported level.
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownBackend(value) => {
                write!(f, "unknown {ENV_STORE} `{value}`; expected json|sqlite")
            }
            Self::InvalidLogLevel(message) => write!(f, "invalid {ENV_LOG_LEVEL}: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Resolved core configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub backend: StoreBackend,
    pub data_path: PathBuf,
    pub log_level: &'static str,
    /// Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let backend = match read(ENV_STORE).map(|value| value.to_ascii_lowercase()) {
            None => StoreBackend::Json,
            Some(value) if value == "json" => StoreBackend::Json,
            Some(value) if value == "sqlite" => StoreBackend::Sqlite,
            Some(other) => return Err(ConfigError::UnknownBackend(other)),
        };

        let data_path = read(ENV_DATA_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| backend.default_path());

        let log_level = match read(ENV_LOG_LEVEL) {
            Some(value) => normalize_level(&value).map_err(ConfigError::InvalidLogLevel)?,
            None => default_log_level(),
        };

        Ok(Self {
            backend,
            data_path,
            log_level,
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
        })
    }

    /// Starts file logging when a log directory is configured.
    ///
    /// Returns `Ok(false)` when logging is not configured.
    pub fn init_logging(&self) -> Result<bool, String> {
        let Some(log_dir) = &self.log_dir else {
            return Ok(false);
        };
        let log_dir = log_dir
            .to_str()
            .ok_or_else(|| format!("log_dir is not valid UTF-8: `{}`", log_dir.display()))?;
        init_logging(self.log_level, log_dir)?;
        Ok(true)
    }
}

/// Builds the configured adapter and opens a store over it.
pub fn open_store(config: &CoreConfig) -> StoreResult<ProjectStore<Box<dyn SnapshotRepository>>> {
    let repo: Box<dyn SnapshotRepository> = match config.backend {
        StoreBackend::Json => Box::new(JsonFileSnapshotRepository::new(&config.data_path)),
        StoreBackend::Sqlite => Box::new(SqliteSnapshotRepository::open(&config.data_path)?),
    };
    ProjectStore::open(repo)
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, StoreBackend, ENV_DATA_PATH, ENV_LOG_LEVEL, ENV_STORE};
    use crate::logging::default_log_level;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn resolve(pairs: &[(&str, &str)]) -> Result<CoreConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        CoreConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_json_store_without_logging() {
        let config = resolve(&[]).unwrap();
        assert_eq!(config.backend, StoreBackend::Json);
        assert_eq!(config.data_path, PathBuf::from("data/projects.json"));
        assert_eq!(config.log_level, default_log_level());
        assert!(config.log_dir.is_none());
        assert_eq!(config.init_logging(), Ok(false));
    }

    #[test]
    fn sqlite_backend_uses_its_own_default_path_and_honors_overrides() {
        let config = resolve(&[(ENV_STORE, " SQLite ")]).unwrap();
        assert_eq!(config.backend, StoreBackend::Sqlite);
        assert_eq!(config.data_path, PathBuf::from("data/devhub.sqlite3"));

        let config = resolve(&[(ENV_STORE, "sqlite"), (ENV_DATA_PATH, "/tmp/hub.db")]).unwrap();
        assert_eq!(config.data_path, PathBuf::from("/tmp/hub.db"));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = resolve(&[(ENV_STORE, "  "), (ENV_DATA_PATH, "")]).unwrap();
        assert_eq!(config.backend, StoreBackend::Json);
        assert_eq!(config.data_path, PathBuf::from("data/projects.json"));
    }

    #[test]
    fn rejects_unknown_backend_and_level() {
        assert_eq!(
            resolve(&[(ENV_STORE, "postgres")]).unwrap_err(),
            ConfigError::UnknownBackend("postgres".to_string())
        );
        assert!(matches!(
            resolve(&[(ENV_LOG_LEVEL, "loud")]).unwrap_err(),
            ConfigError::InvalidLogLevel(_)
        ));
        assert_eq!(resolve(&[(ENV_LOG_LEVEL, "WARN")]).unwrap().log_level, "warn");
    }
}
