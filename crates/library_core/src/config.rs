//! Runtime configuration read from the environment.
//!
//! # Responsibility
//! - Select the repository backend and the data/database/log locations.
//!
//! # Invariants
//! - Values are trimmed; blank values fall back to defaults.
//! - Unsupported values are rejected, never silently replaced.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_REPOSITORY: &str = "LIBRARY_REPOSITORY";
pub const ENV_DATA_DIR: &str = "LIBRARY_DATA_DIR";
pub const ENV_DATABASE_PATH: &str = "LIBRARY_DATABASE_PATH";
pub const ENV_LOG_LEVEL: &str = "LIBRARY_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "LIBRARY_LOG_DIR";

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_DATABASE_PATH: &str = "library.sqlite3";

/// Storage backend behind the repository contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepositoryBackend {
    #[default]
    Memory,
    Database,
}

impl RepositoryBackend {
    /// Parses `memory` or `database`, case-insensitively.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "database" => Ok(Self::Database),
            _ => Err(ConfigError::UnsupportedBackend(value.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Database => "database",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnsupportedBackend(String),
    UnsupportedLogLevel(String),
    EmptyPath(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedBackend(value) => write!(
                f,
                "unsupported repository backend `{value}`; expected `memory` or `database`"
            ),
            Self::UnsupportedLogLevel(value) => write!(f, "unsupported log level `{value}`"),
            Self::EmptyPath(name) => write!(f, "`{name}` must not be empty"),
        }
    }
}

impl Error for ConfigError {}

/// Process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryConfig {
    pub backend: RepositoryBackend,
    /// Directory holding the four import files.
    pub data_dir: PathBuf,
    /// SQLite file, or `:memory:` for an in-memory database.
    pub database_path: String,
    pub log_level: String,
    /// Logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            backend: RepositoryBackend::Memory,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl LibraryConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which maps variable names to values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(value) = read(ENV_REPOSITORY) {
            config.backend = RepositoryBackend::parse(&value)?;
        }
        if let Some(value) = read(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(value);
        }
        if let Some(value) = read(ENV_DATABASE_PATH) {
            config.database_path = value;
        }
        if let Some(value) = read(ENV_LOG_LEVEL) {
            config.log_level = normalize_log_level(&value)?;
        }
        config.log_dir = read(ENV_LOG_DIR).map(PathBuf::from);

        Ok(config)
    }

    /// Checks invariants after command-line overrides were applied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("data_dir"));
        }
        if self.database_path.trim().is_empty() {
            return Err(ConfigError::EmptyPath("database_path"));
        }
        normalize_log_level(&self.log_level)?;
        Ok(())
    }
}

fn normalize_log_level(level: &str) -> Result<String, ConfigError> {
    normalize_level(level)
        .map(str::to_string)
        .map_err(|_| ConfigError::UnsupportedLogLevel(level.to_string()))
}
