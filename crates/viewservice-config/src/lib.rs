//! Configuration management for the view service
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. CLI arguments (highest precedence, applied by the binary)
//! 2. Environment variables (`VSVC_*` prefix, `__` between sections)
//! 3. viewservice.local.toml (local overrides)
//! 4. viewservice.toml (project config)
//! 5. ~/.config/viewservice/config.toml (user defaults)
//! 6. Built-in defaults (lowest precedence)

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use viewservice::{DEFAULT_DEAD_PINGS, DEFAULT_PING_INTERVAL, ServiceConfig};

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::{LOCAL_CONFIG_FILE, PROJECT_CONFIG_FILE, layered_files, user_config_file};

/// Main view service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewServiceConfig {
    pub server: ServerSection,
    pub detector: DetectorConfig,
    pub client: ClientSection,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind_address: String,
    pub max_connections: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:7700".to_string(),
            max_connections: 1024,
        }
    }
}

/// Heartbeat timing shared by the service and its replica servers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub ping_interval_ms: u64,
    pub dead_pings: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            ping_interval_ms: DEFAULT_PING_INTERVAL.as_millis() as u64,
            dead_pings: DEFAULT_DEAD_PINGS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSection {
    pub request_timeout_ms: u64,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            request_timeout_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing-subscriber` filter directive, e.g. `info` or
    /// `viewservice=debug`. `RUST_LOG` takes precedence.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl ViewServiceConfig {
    /// Load configuration with `dir` as the project directory
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(dir).load()
    }

    /// The validated core timing configuration.
    pub fn service_config(&self) -> Result<ServiceConfig, ConfigError> {
        let config = ServiceConfig::new(
            Duration::from_millis(self.detector.ping_interval_ms),
            self.detector.dead_pings,
        );
        config
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.client.request_timeout_ms)
    }

    /// Renders the effective configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ViewServiceConfig::default();
        assert_eq!(config.server.bind_address, "127.0.0.1:7700");
        assert_eq!(config.detector.ping_interval_ms, 100);
        assert_eq!(config.detector.dead_pings, 5);
        assert_eq!(config.log.filter, "info");
    }

    #[test]
    fn test_service_config_conversion() {
        let config = ViewServiceConfig::default();
        let service = config.service_config().unwrap();
        assert_eq!(service.ping_interval, Duration::from_millis(100));
        assert_eq!(service.dead_pings, 5);
    }

    #[test]
    fn test_invalid_dead_pings_rejected() {
        let mut config = ViewServiceConfig::default();
        config.detector.dead_pings = 1;
        assert!(matches!(
            config.service_config(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_toml_rendering_round_trips_keys() {
        let rendered = ViewServiceConfig::default().to_toml_string().unwrap();
        assert!(rendered.contains("[detector]"));
        assert!(rendered.contains("dead_pings = 5"));
        assert!(rendered.contains("bind_address = \"127.0.0.1:7700\""));
    }
}
