//! Settings Persistence
//!
//! Keeps the active configuration together with the file it came from.
//! Every successful update through [`SettingsPersistence::set_and_save`] is
//! written back immediately.

use crate::config::Config;
use crate::error::{SettingsError, SettingsResult};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Settings persistence layer
#[derive(Debug, Clone)]
pub struct SettingsPersistence {
    config: Config,
    path: PathBuf,
}

impl SettingsPersistence {
    /// Wrap a config that will be saved to `path`
    pub fn new(config: Config, path: impl Into<PathBuf>) -> Self {
        Self {
            config,
            path: path.into(),
        }
    }

    /// `<config dir>/axlekit/settings.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("axlekit").join("settings.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no configuration directory on this platform".into())
            })
    }

    /// Load settings from file
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let config = Config::load_from_file(path)?;
        Ok(Self::new(config, path))
    }

    /// Load settings, falling back to defaults when the file is missing or invalid
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("No settings at {}, using defaults", path.display());
            return Self::new(Config::default(), path);
        }

        match Config::load_from_file(path) {
            Ok(config) => {
                info!("Loaded settings from {}", path.display());
                Self::new(config, path)
            }
            Err(e) => {
                warn!(
                    "Ignoring invalid settings file {}: {}; using defaults",
                    path.display(),
                    e
                );
                Self::new(Config::default(), path)
            }
        }
    }

    /// Save settings to their file
    pub fn save(&self) -> SettingsResult<()> {
        self.config.save_to_file(&self.path)
    }

    /// Update one setting and persist it
    ///
    /// A rejected value leaves both the config and the file untouched.
    pub fn set_and_save(&mut self, key: &str, value: &str) -> SettingsResult<()> {
        self.config.set_var(key, value)?;
        self.save()?;
        info!("Wrote {} = {} to {}", key, value, self.path.display());
        Ok(())
    }

    /// Get reference to config
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable reference to config
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// File the settings are saved to
    pub fn path(&self) -> &Path {
        &self.path
    }
}
