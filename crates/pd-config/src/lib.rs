//! PropDesk Configuration System
//!
//! This crate provides TOML-based configuration with environment variable override support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub mongodb: MongoConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,

    /// Enable development mode
    pub dev_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mongodb: MongoConfig::default(),
            storage: StorageConfig::default(),
            auth: AuthConfig::default(),
            dev_mode: false,
        }
    }
}

/// MongoDB configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017/?replicaSet=rs0&directConnection=true".to_string(),
            database: "propdesk".to_string(),
        }
    }
}

/// Uploaded-file storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base URL under which stored objects are served
    pub public_base_url: String,
    /// GridFS bucket name for uploaded files
    pub bucket: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            public_base_url: "http://localhost:8080/files".to_string(),
            bucket: "uploads".to_string(),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Relax password hashing cost and policy (development only)
    pub lenient_passwords: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            lenient_passwords: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        let loader = ConfigLoader::new();
        loader.load()
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# PropDesk Configuration
# Environment variables override these settings

[mongodb]
uri = "mongodb://localhost:27017/?replicaSet=rs0&directConnection=true"
database = "propdesk"

[storage]
public_base_url = "http://localhost:8080/files"
bucket = "uploads"

[auth]
lenient_passwords = false

dev_mode = false
"#
        .to_string()
    }
}
