//! Server configuration.
//!
//! Settings are sourced from an optional `biomatch` config file (TOML, YAML,
//! or JSON, discovered in the working directory) layered with environment
//! variables prefixed `BIOMATCH_SERVER__`. Nested fields use `__` as the
//! separator, e.g. `BIOMATCH_SERVER__ENGINE__THRESHOLD=12`.

use std::net::SocketAddr;
use std::time::Duration;

use engine::EngineConfig;
use serde::{Deserialize, Serialize};
use store::StoreConfig;

/// Top-level server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in megabytes.
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Whether to allow cross-origin requests.
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,

    /// Log level filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON instead of human-readable lines.
    #[serde(default)]
    pub log_json: bool,

    /// Whether to install the Prometheus recorder and serve `/metrics`.
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,

    /// Matching engine settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Record store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Result cache settings.
    #[serde(default)]
    pub cache: CacheSettings,
}

/// Result cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Whether search results are cached at all.
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// Time-to-live for cached entries in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,

    /// Redis connection URL. Requires the `backend-redis` feature; when
    /// absent the in-process cache is used.
    #[serde(default)]
    pub redis_url: Option<String>,
}

impl CacheSettings {
    /// Entry time-to-live as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl_secs: default_cache_ttl_secs(),
            redis_url: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from file and environment sources.
    pub fn load() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("biomatch").required(false))
            .add_source(config::Environment::with_prefix("BIOMATCH_SERVER").separator("__"))
            .build()?;
        let config: ServerConfig = settings.try_deserialize()?;
        Ok(config)
    }

    /// The socket address to bind to.
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr.parse()?)
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Maximum request body size in bytes.
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            enable_cors: default_enable_cors(),
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: default_metrics_enabled(),
            engine: EngineConfig::default(),
            store: StoreConfig::default(),
            cache: CacheSettings::default(),
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_mb() -> usize {
    10
}

fn default_enable_cors() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_ttl_secs() -> u64 {
    24 * 60 * 60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_body_size_mb, 10);
        assert!(config.enable_cors);
        assert!(config.metrics_enabled);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl_secs, 86_400);
        assert!(config.cache.redis_url.is_none());
    }

    #[test]
    fn socket_addr_combines_bind_addr_and_port() {
        let config = ServerConfig {
            bind_addr: "127.0.0.1".to_string(),
            port: 9090,
            ..ServerConfig::default()
        };
        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:9090");
    }

    #[test]
    fn invalid_bind_addr_is_rejected() {
        let config = ServerConfig {
            bind_addr: "not-an-address".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn helpers_convert_units() {
        let config = ServerConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.max_body_size(), 10 * 1024 * 1024);
        assert_eq!(config.cache.ttl(), Duration::from_secs(86_400));
    }

    #[test]
    fn deserializes_with_partial_fields() {
        let json = r#"{ "port": 3000, "cache": { "enabled": false } }"#;
        let config: ServerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.port, 3000);
        assert!(!config.cache.enabled);
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.cache.ttl_secs, 86_400);
    }
}
