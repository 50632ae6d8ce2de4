//! YAML configuration file support for the matching pipeline.
//!
//! One file configures the store, engine, and cache together. The server
//! crate layers its own environment-driven configuration on top of the same
//! per-crate structs; this module is the file-based path for embedding the
//! pipeline directly.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "capture-kiosk"
//!
//! store:
//!   backend:
//!     type: in_memory
//!   compression:
//!     codec: zstd
//!     level: 3
//!   bucket:
//!     prefix_bits: 8
//!     bucket_count: 256
//!
//! engine:
//!   threshold: 10
//!   radius: 1
//!   strategy: bucketed
//!   use_parallel: false
//!
//! cache:
//!   enabled: true
//!   ttl_secs: 86400
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use engine::EngineConfig;
use serde::{Deserialize, Serialize};
use store::StoreConfig;
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for the matching pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiomatchConfig {
    /// Configuration format version
    #[serde(default = "default_config_version")]
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    /// Record store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Match engine configuration
    #[serde(default)]
    pub engine: EngineConfig,

    /// Result cache configuration
    #[serde(default)]
    pub cache: CacheYamlConfig,
}

impl BiomatchConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: BiomatchConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => {}
            v => return Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }

        self.store
            .bucket
            .validate()
            .map_err(|err| ConfigLoadError::Validation(err.to_string()))?;
        self.engine
            .validate()
            .map_err(|err| ConfigLoadError::Validation(err.to_string()))?;
        self.cache.validate()?;

        Ok(())
    }
}

impl Default for BiomatchConfig {
    fn default() -> Self {
        Self {
            version: default_config_version(),
            name: None,
            store: StoreConfig::default(),
            engine: EngineConfig::default(),
            cache: CacheYamlConfig::default(),
        }
    }
}

/// Result cache YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheYamlConfig {
    #[serde(default = "true_value")]
    pub enabled: bool,

    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl CacheYamlConfig {
    /// Entry time-to-live as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.ttl_secs == 0 {
            return Err(ConfigLoadError::Validation(
                "cache.ttl_secs must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheYamlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: default_ttl_secs(),
        }
    }
}

// Helper functions for serde defaults
fn default_config_version() -> String {
    "1.0".to_string()
}
fn true_value() -> bool {
    true
}
fn default_ttl_secs() -> u64 {
    24 * 60 * 60
}
