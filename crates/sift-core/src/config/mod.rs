//! Configuration types for sift.
//!
//! Configuration is loaded from a single YAML file (`sift.yaml`) with three
//! sections:
//!
//! - **upstream**: how to reach the database being introspected
//! - **introspection**: which schema to read and engine-quirk overrides
//! - **logging**: default log level when `RUST_LOG` is not set

pub mod introspection;
pub mod upstream;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use introspection::{CapabilityOverrides, IntrospectionConfig};
pub use upstream::{ConnectionPoolConfig, UpstreamConfig};

/// Complete sift configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiftConfig {
    /// Database connection.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Introspection scope.
    #[serde(default)]
    pub introspection: IntrospectionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset (e.g. `info`,
    /// `sift_core=debug`).
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SiftConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.introspection.schema.trim().is_empty() {
            return Err(ConfigError::Config(
                "introspection.schema must not be empty".to_string(),
            ));
        }
        if self.upstream.pool.max_connections == 0 {
            return Err(ConfigError::Config(
                "upstream.pool.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
