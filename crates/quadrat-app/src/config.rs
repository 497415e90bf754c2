//! Editor configuration files.

use quadrat_core::EditorConfig;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load the editor configuration, or defaults when no path is given.
///
/// Fields missing from the file keep their default values, as do values
/// that are out of range.
pub fn load_config(path: Option<&Path>) -> ConfigResult<EditorConfig> {
    let Some(path) = path else {
        log::debug!("No configuration file given, using defaults");
        return Ok(EditorConfig::default());
    };
    let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = EditorConfig::from_json(&json).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Write a configuration as pretty JSON.
pub fn save_config(path: &Path, config: &EditorConfig) -> ConfigResult<()> {
    let json = config.to_json().map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
