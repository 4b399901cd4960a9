//! Unified path management for wahlomat configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/wahlomat/          # Config directory (platform config dir)
//! ├── config.toml              # Application configuration
//! └── logs/                    # Application logs
//!     └── wahlomat.log.YYYY-MM-DD
//! ```
//!
//! The API key is never stored here.

use std::path::PathBuf;

const APP_DIR_NAME: &str = "wahlomat";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves every location the application reads or writes.
pub struct WahlomatPaths;

impl WahlomatPaths {
    /// Returns the wahlomat configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/wahlomat/`)
    /// - `Err(PathError::ConfigDirNotFound)`: Could not determine directory
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the directory for rolling log files.
    pub fn logs_dir() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("logs"))
    }
}
