//! Daemon configuration.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use gantry_push::StrategyItem;

use crate::error::GatewayError;

/// Top-level gateway configuration, loaded from a TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// Debug mode admits TCP connections from addresses outside the
    /// topology.
    pub debug: bool,
    /// Path to the topology node list (JSON array).
    pub topology: PathBuf,
    pub monitor: MonitorConfig,
    pub push: PushConfig,
    pub liveness: LivenessConfig,
    pub metrics: MetricsConfig,
    /// Process-wide default alert strategy, applied to clients that
    /// register without one.
    pub strategy: Vec<StrategyItem>,
}

/// TCP monitor listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    pub listen: String,
}

/// Push/HTTP surface settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PushConfig {
    pub listen: String,
    /// Client heartbeat probe period.
    pub heartbeat_secs: u64,
}

/// Lane liveness monitor settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LivenessConfig {
    pub poll_millis: u64,
    pub stale_secs: i64,
}

/// Metric push ingestion settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    /// Metric names accepted from the external collector, each mapped to
    /// the synthetic type code stamped on its events.
    pub allowed: HashMap<String, u8>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            debug: false,
            topology: PathBuf::from("topology.json"),
            monitor: MonitorConfig::default(),
            push: PushConfig::default(),
            liveness: LivenessConfig::default(),
            metrics: MetricsConfig::default(),
            strategy: Vec::new(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:9030".to_string(),
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:9040".to_string(),
            heartbeat_secs: 30,
        }
    }
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            poll_millis: 100,
            stale_secs: 20,
        }
    }
}

impl GatewayConfig {
    /// Loads and validates a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GatewayError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|source| GatewayError::ConfigIo {
                path: path.as_ref().display().to_string(),
                source,
            })?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, GatewayError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), GatewayError> {
        if self.liveness.poll_millis == 0 {
            return Err(GatewayError::ConfigInvalid(
                "liveness.poll_millis must be positive".to_string(),
            ));
        }
        if self.liveness.stale_secs <= 0 {
            return Err(GatewayError::ConfigInvalid(
                "liveness.stale_secs must be positive".to_string(),
            ));
        }
        if self.push.heartbeat_secs == 0 {
            return Err(GatewayError::ConfigInvalid(
                "push.heartbeat_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// The metric allow-list: metric name → synthetic type code.
    #[must_use]
    pub fn allowed_metrics(&self) -> HashMap<String, u8> {
        self.metrics.allowed.clone()
    }
}
