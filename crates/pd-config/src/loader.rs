//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "propdesk.toml",
    "./config/config.toml",
    "./config/propdesk.toml",
    "/etc/propdesk/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        // Start with defaults
        let mut config = AppConfig::default();

        // Try to load from file
        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        // Apply environment variable overrides
        self.apply_env_overrides(&mut config);

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(&self) -> Option<PathBuf> {
        // Check explicit path first
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        // Check PROPDESK_CONFIG env var
        if let Ok(path) = env::var("PROPDESK_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // Search standard paths
        for path in CONFIG_PATHS {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&self, config: &mut AppConfig) {
        // MongoDB
        if let Ok(val) = env::var("PROPDESK_MONGODB_URI") {
            config.mongodb.uri = val;
        }
        if let Ok(val) = env::var("PROPDESK_MONGODB_DATABASE") {
            config.mongodb.database = val;
        }

        // Storage
        if let Ok(val) = env::var("PROPDESK_STORAGE_PUBLIC_BASE_URL") {
            config.storage.public_base_url = val;
        }
        if let Ok(val) = env::var("PROPDESK_STORAGE_BUCKET") {
            config.storage.bucket = val;
        }

        // Auth
        if let Ok(val) = env::var("PROPDESK_AUTH_LENIENT_PASSWORDS") {
            config.auth.lenient_passwords = val.parse().unwrap_or(false);
        }

        // General
        if let Ok(val) = env::var("PROPDESK_DEV_MODE") {
            config.dev_mode = val.parse().unwrap_or(false);
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
