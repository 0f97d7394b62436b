//! Configuration loading from disk.

use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::config::schema::Properties;

/// Directory searched for upward from the working directory.
pub const CONFIG_DIR_NAME: &str = "config";
/// Environment variable selecting the properties file.
pub const PROFILE_ENV: &str = "GO_PROFILE";
pub const DEFAULT_PROFILE: &str = "default";
pub const PROPERTIES_EXTENSION: &str = "properties";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no config directory found above {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: java_properties::PropertiesError,
    },
    #[error("config {0} not found")]
    MissingKey(String),
}

/// Profile name from `GO_PROFILE`, `default` when unset or blank.
pub fn profile_from_env() -> String {
    env::var(PROFILE_ENV)
        .ok()
        .map(|p| p.trim().to_owned())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_PROFILE.to_owned())
}

/// Walk up from `start` until a directory containing `config/` is found.
pub fn find_config_dir(start: &Path) -> Result<PathBuf, ConfigError> {
    find_config_dir_within(start, None)
}

/// [`find_config_dir`] that gives up after checking `boundary`.
pub fn find_config_dir_within(
    start: &Path,
    boundary: Option<&Path>,
) -> Result<PathBuf, ConfigError> {
    for dir in start.ancestors() {
        let candidate = dir.join(CONFIG_DIR_NAME);
        if candidate.is_dir() {
            return Ok(candidate);
        }
        if Some(dir) == boundary {
            break;
        }
    }
    Err(ConfigError::NotFound(start.to_path_buf()))
}

/// `<dir>/<profile>.properties`
pub fn properties_path(dir: &Path, profile: &str) -> PathBuf {
    dir.join(format!("{}.{}", profile, PROPERTIES_EXTENSION))
}

/// Parse a properties file (`key=value` or `key: value`, `#`/`!` comments,
/// `\` line continuations). Values are taken literally; nothing is
/// substituted from the process environment.
pub fn load_file(path: &Path) -> Result<Properties, ConfigError> {
    let file = File::open(path).map_err(|source| ConfigError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let values = java_properties::read(BufReader::new(file)).map_err(|source| {
        ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })?;
    Ok(values.into_iter().collect())
}

pub fn load_properties(dir: &Path, profile: &str) -> Result<Properties, ConfigError> {
    load_file(&properties_path(dir, profile))
}
