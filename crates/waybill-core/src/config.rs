//! Configuration management for Waybill.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main application configuration.
///
/// This is loaded from `~/.config/waybill/config.toml` (or platform
/// equivalent). If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General application settings
    pub general: GeneralConfig,
    /// Browser session settings
    pub browser: BrowserSettings,
    /// Tracking orchestration settings
    pub tracking: TrackingConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `WAYBILL_HEADLESS`: Override browser headless mode (true/false)
    /// - `WAYBILL_LAUNCH_TIMEOUT_MS`: Override browser launch timeout
    /// - `WAYBILL_SELECTOR_TIMEOUT_MS`: Override selector wait timeout
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;

        // Override from environment
        if let Ok(val) = std::env::var("WAYBILL_HEADLESS") {
            if let Ok(headless) = val.parse() {
                config.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Ok(val) = std::env::var("WAYBILL_LAUNCH_TIMEOUT_MS") {
            if let Ok(ms) = val.parse() {
                config.browser.launch_timeout_ms = ms;
                tracing::debug!("Override browser.launch_timeout_ms from env: {}", ms);
            }
        }

        if let Ok(val) = std::env::var("WAYBILL_SELECTOR_TIMEOUT_MS") {
            if let Ok(ms) = val.parse() {
                config.browser.selector_timeout_ms = ms;
                tracing::debug!("Override browser.selector_timeout_ms from env: {}", ms);
            }
        }

        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/waybill/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("ca", "waybill", "waybill").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Service name reported by the status probe
    pub service_name: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            service_name: "waybill".to_string(),
        }
    }
}

/// Browser session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run browser in headless mode
    pub headless: bool,
    /// Browser launch timeout in milliseconds
    pub launch_timeout_ms: u64,
    /// Navigation timeout in milliseconds
    pub navigation_timeout_ms: u64,
    /// How long to wait for a selector before giving up, in milliseconds
    pub selector_timeout_ms: u64,
    /// Poll interval while waiting for a selector, in milliseconds
    pub selector_poll_interval_ms: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            launch_timeout_ms: 60_000,
            navigation_timeout_ms: 60_000,
            selector_timeout_ms: 30_000,
            selector_poll_interval_ms: 250,
        }
    }
}

/// Tracking orchestration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Log each tracking number's race launch at info level (debug otherwise)
    pub log_provider_launches: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            log_provider_launches: true,
        }
    }
}
