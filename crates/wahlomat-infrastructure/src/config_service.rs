//! Configuration service implementation.
//!
//! Loads `AppConfig` from `config.toml` (default location or an explicit path) and
//! caches the result.

use crate::paths::WahlomatPaths;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use wahlomat_core::config::AppConfig;
use wahlomat_core::error::{Result, WahlError};

/// Configuration service that loads and caches the application configuration.
///
/// A missing file is not an error: the built-in defaults apply. A file that exists but
/// fails to parse or validate is reported, so typos don't silently fall back to the
/// defaults.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    /// Creates a service reading the default `config.toml`.
    ///
    /// # Errors
    ///
    /// Returns `WahlError::Config` if the config directory cannot be determined.
    pub fn new_default() -> Result<Self> {
        let path = WahlomatPaths::config_file().map_err(|e| WahlError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    /// Creates a service reading the given file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<AppConfig> {
        if let Ok(read_lock) = self.config.read()
            && let Some(ref cached) = *read_lock
        {
            return Ok(cached.clone());
        }

        let loaded = Self::load_from(&self.path)?;

        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    fn load_from(path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            tracing::info!(
                "[ConfigService] No config file at {}, using defaults",
                path.display()
            );
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(path)?;
        let config = AppConfig::from_toml_str(&content).map_err(|e| {
            WahlError::config(format!("Failed to load {}: {}", path.display(), e))
        })?;

        tracing::info!("[ConfigService] Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));

        let config = service.get_config().expect("defaults should load");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_loads_file_and_caches_until_invalidated() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "run_timeout_secs = 15\n").unwrap();

        let service = ConfigService::with_path(&path);
        assert_eq!(service.get_config().unwrap().run_timeout_secs, 15);

        fs::write(&path, "run_timeout_secs = 45\n").unwrap();
        assert_eq!(
            service.get_config().unwrap().run_timeout_secs,
            15,
            "cached value should be served"
        );

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().run_timeout_secs, 45);
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[parties]\nnames = []\n").unwrap();

        let err = ConfigService::with_path(&path).get_config().unwrap_err();
        assert!(matches!(err, WahlError::Config(_)));
        assert!(err.to_string().contains("config.toml"));
    }
}
