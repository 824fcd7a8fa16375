//! Configuration management for fleetlog.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Collection;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "fleetlog";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "fleet.db";

/// Browser local storage allows about 5 MiB per origin.
const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FLEETLOG_`, nested keys joined by `__`)
/// 2. TOML config file at `~/.config/fleetlog/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Sample-data seeding per collection.
    pub seed: SeedConfig,
    /// Public report form links.
    pub public_form: PublicFormConfig,
    /// Change notification configuration.
    pub notifications: NotificationConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/fleetlog/fleet.db`
    pub database_path: Option<PathBuf>,
    /// Maximum total size of stored values in bytes.
    /// Set to 0 for unlimited.
    pub quota_bytes: u64,
}

/// Which collections are filled with sample data the first time they load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Seed the vehicle registry.
    pub vehicles: bool,
    /// Seed the maintenance log.
    pub maintenance_records: bool,
    /// Seed the public reports.
    pub public_reports: bool,
}

/// Where QR codes on vehicles point to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicFormConfig {
    /// Origin of the web application, e.g. `https://fleet.example.com`.
    pub base_url: String,
    /// Route of the public form, appended to the base URL.
    pub route: String,
}

/// Change notification configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Events buffered per subscriber before it is considered lagging.
    pub channel_capacity: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            vehicles: true,
            maintenance_records: true,
            public_reports: false,
        }
    }
}

impl SeedConfig {
    /// Seed nothing.
    #[must_use]
    pub fn none() -> Self {
        Self {
            vehicles: false,
            maintenance_records: false,
            public_reports: false,
        }
    }

    /// Whether the given collection is seeded.
    #[must_use]
    pub fn enabled_for(&self, collection: Collection) -> bool {
        match collection {
            Collection::Vehicles => self.vehicles,
            Collection::MaintenanceRecords => self.maintenance_records,
            Collection::PublicReports => self.public_reports,
        }
    }
}

impl Default for PublicFormConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            route: "/#/public".to_string(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("FLEETLOG_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.notifications.channel_capacity == 0 {
            return Err(Error::ConfigValidation {
                message: "channel_capacity must be greater than 0".to_string(),
            });
        }

        let base_url = self.public_form.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::ConfigValidation {
                message: format!("base_url must be an http(s) URL: '{base_url}'"),
            });
        }

        if !self.public_form.route.starts_with('/') {
            return Err(Error::ConfigValidation {
                message: format!("route must start with '/': '{}'", self.public_form.route),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}
