//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use wl_core::{ValidationError, WorkdayTargets};
use wl_store::{DEFAULT_SEPARATOR, Store, StoreError};

/// Application configuration.
///
/// Built once in `main` and handed to every command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the work log file.
    pub log_path: PathBuf,
    /// Field separator inside the work log file.
    pub separator: char,
    /// Hours that make a complete work day.
    pub hours_target: f64,
    /// Hours beyond which overtime is at 100%.
    pub hours_max: f64,
    /// `wl log` pages output when more entries than this are requested.
    pub pager_threshold: usize,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            log_path: data_dir.join("worklog.log"),
            separator: DEFAULT_SEPARATOR,
            hours_target: 8.0,
            hours_max: 10.0,
            pager_threshold: 20,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (WL_*)
        figment = figment.merge(Env::prefixed("WL_"));

        figment.extract()
    }

    /// Working hour targets, validated.
    pub fn targets(&self) -> Result<WorkdayTargets, ValidationError> {
        WorkdayTargets::from_hours(self.hours_target, self.hours_max)
    }

    /// Opens the configured work log.
    pub fn open_store(&self) -> Result<Store, StoreError> {
        Store::open(&self.log_path, self.separator)
    }
}

/// Returns the platform-specific config directory for wl.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("wl"))
}

/// Returns the platform-specific data directory for wl.
///
/// On Linux: `~/.local/share/wl`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("wl"))
}
