//! Runner configuration.
//!
//! Layers, lowest first: built-in defaults, a TOML file, the environment,
//! command-line flags. The file is the one passed with `--config`, else
//! `./migrate.toml`, else `<config dir>/remarkable/migrate.toml`; a missing
//! default file is not an error.
//!
//! ```toml
//! database_url = "postgres://remarkable@localhost/remarkable"
//! version_table = "alembic_version"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::DEFAULT_VERSION_TABLE;

pub const CONFIG_FILE: &str = "migrate.toml";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("No database URL: set DATABASE_URL, pass --url, or add database_url to migrate.toml")]
    MissingUrl,

    #[error("Invalid version table name '{0}'")]
    InvalidVersionTable(String),
}

/// Values as they appear in the TOML file; everything optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub database_url: Option<String>,
    pub version_table: Option<String>,
}

/// Overrides from the environment and the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database_url: Option<String>,
    pub version_table: Option<String>,
}

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: Option<String>,
    pub version_table: String,
    /// File the values came from, if any.
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            version_table: DEFAULT_VERSION_TABLE.to_string(),
            source: None,
        }
    }
}

impl FileConfig {
    pub fn from_toml(path: &Path, text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(path, &text)
    }
}

/// Default file locations in lookup order.
pub fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("remarkable").join(CONFIG_FILE));
    }
    paths
}

impl Config {
    /// Load and merge all layers. `explicit` is the `--config` path, which
    /// must exist; `overrides` already combine environment and flags (clap
    /// reads `DATABASE_URL` for `--url`).
    pub fn load(explicit: Option<&Path>, overrides: Overrides) -> Result<Self, ConfigError> {
        let (file, source) = match explicit {
            Some(path) => (FileConfig::read(path)?, Some(path.to_path_buf())),
            None => match default_paths().into_iter().find(|p| p.is_file()) {
                Some(path) => (FileConfig::read(&path)?, Some(path)),
                None => (FileConfig::default(), None),
            },
        };
        Self::merge(file, source, overrides)
    }

    pub fn merge(
        file: FileConfig,
        source: Option<PathBuf>,
        overrides: Overrides,
    ) -> Result<Self, ConfigError> {
        let defaults = Config::default();
        let version_table = overrides
            .version_table
            .or(file.version_table)
            .unwrap_or(defaults.version_table);
        if !valid_table_name(&version_table) {
            return Err(ConfigError::InvalidVersionTable(version_table));
        }
        Ok(Self {
            database_url: overrides.database_url.or(file.database_url),
            version_table,
            source,
        })
    }

    pub fn require_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or(ConfigError::MissingUrl)
    }
}

fn valid_table_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 63
        && name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
