//! Configuration management for Leap.
//!
//! This module provides configuration loading, saving, and defaults.
//! Configuration is stored in TOML format in a platform-appropriate location.

use crate::error::{LeapError, Result};
use crate::types::{DEFAULT_DECREMENT, DEFAULT_INCREMENT};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main configuration structure for Leap.
///
/// ## Example Configuration File (leap.toml)
///
/// ```toml
/// [general]
/// data_file = "/home/me/.local/share/leap/leap.txt"
/// max_entries = 1000
/// backup_window_hours = 24
///
/// [matching]
/// separator = "__"
/// ignore_case = false
/// keep_symlinks = false
/// completion_count = 9
///
/// [weights]
/// increment = 10.0
/// decrement = 15.0
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage and housekeeping settings
    pub general: GeneralConfig,

    /// Pattern matching and completion settings
    pub matching: MatchingConfig,

    /// Default weight adjustments
    pub weights: WeightsConfig,
}

/// General configuration options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Home directory, never stored (None = detect)
    pub home: Option<PathBuf>,

    /// Database file location (None = default location)
    pub data_file: Option<PathBuf>,

    /// Minimum age of the backup before it is refreshed
    pub backup_window_hours: u64,

    /// Number of entries above which maintenance evicts
    pub max_entries: usize,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            home: None,
            data_file: None,
            backup_window_hours: 24,
            max_entries: 1000,
            log_level: "warn".to_string(),
        }
    }
}

/// Matching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Token separating the needle from a completion index
    pub separator: String,

    /// Compare paths and tokens case-insensitively from the first pass
    pub ignore_case: bool,

    /// Record paths as given instead of resolving symlinks
    pub keep_symlinks: bool,

    /// Number of candidates offered in completion mode
    pub completion_count: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        MatchingConfig {
            separator: "__".to_string(),
            ignore_case: false,
            keep_symlinks: false,
            completion_count: 9,
        }
    }
}

/// Weight adjustment defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightsConfig {
    /// Increment applied by `add`
    pub increment: f64,

    /// Decrement applied by `decrease`
    pub decrement: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        WeightsConfig {
            increment: DEFAULT_INCREMENT,
            decrement: DEFAULT_DECREMENT,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default config if no config file exists.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Config::default());
        }

        info!(path = %path.display(), "Loading configuration");
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| LeapError::config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        info!(path = %path.display(), "Saving configuration");
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| LeapError::config(format!("Failed to serialize config: {}", e)))
    }

    /// Reject settings the store and matcher cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.matching.separator.is_empty() {
            return Err(LeapError::config("matching.separator must not be empty"));
        }
        if self.matching.completion_count == 0 {
            return Err(LeapError::config("matching.completion_count must be at least 1"));
        }
        if !(self.weights.increment > 0.0) || !(self.weights.decrement > 0.0) {
            return Err(LeapError::config("weights must be positive"));
        }
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "leap")
            .ok_or_else(|| LeapError::config("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("leap.toml"))
    }

    /// Get the default data directory path.
    pub fn default_data_dir() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "leap")
            .ok_or_else(|| LeapError::config("Could not determine data directory"))?;

        Ok(dirs.data_dir().to_path_buf())
    }

    /// Get the database file (from config or default).
    pub fn data_file(&self) -> Result<PathBuf> {
        if let Some(ref path) = self.general.data_file {
            Ok(path.clone())
        } else {
            Ok(Self::default_data_dir()?.join("leap.txt"))
        }
    }

    /// Get the backup file, which sits next to the database file.
    pub fn backup_file(&self) -> Result<PathBuf> {
        let data_file = self.data_file()?;
        let mut name = data_file.as_os_str().to_os_string();
        name.push(".bak");
        Ok(PathBuf::from(name))
    }

    /// Get the home directory (from config or detected).
    pub fn home_dir(&self) -> Result<PathBuf> {
        if let Some(ref home) = self.general.home {
            Ok(home.clone())
        } else {
            BaseDirs::new()
                .map(|dirs| dirs.home_dir().to_path_buf())
                .ok_or_else(|| LeapError::config("Could not determine home directory"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.max_entries, 1000);
        assert_eq!(config.general.backup_window_hours, 24);
        assert_eq!(config.matching.separator, "__");
        assert_eq!(config.matching.completion_count, 9);
        assert_eq!(config.weights.increment, 10.0);
        assert_eq!(config.weights.decrement, 15.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let mut config = Config::default();
        config.general.max_entries = 50;
        config.general.data_file = Some(temp_dir.path().join("db.txt"));
        config.matching.ignore_case = true;

        config.save_to(&config_path).unwrap();
        let loaded = Config::load_from(&config_path).unwrap();

        assert_eq!(loaded.general.max_entries, 50);
        assert!(loaded.matching.ignore_case);
        assert_eq!(loaded.data_file().unwrap(), temp_dir.path().join("db.txt"));
        assert_eq!(
            loaded.backup_file().unwrap(),
            temp_dir.path().join("db.txt.bak")
        );
    }

    #[test]
    fn test_load_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.general.max_entries, 1000);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("partial.toml");
        fs::write(&config_path, "[matching]\nseparator = \"::\"\n").unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.matching.separator, "::");
        assert_eq!(config.matching.completion_count, 9);
        assert_eq!(config.general.max_entries, 1000);
    }

    #[test]
    fn test_rejects_empty_separator() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("bad.toml");
        fs::write(&config_path, "[matching]\nseparator = \"\"\n").unwrap();

        let err = Config::load_from(&config_path).unwrap_err();
        assert!(matches!(err, LeapError::ConfigError { .. }));
    }

    #[test]
    fn test_configured_home() {
        let mut config = Config::default();
        config.general.home = Some(PathBuf::from("/home/someone"));
        assert_eq!(config.home_dir().unwrap(), PathBuf::from("/home/someone"));
    }
}
