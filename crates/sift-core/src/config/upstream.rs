//! Where the introspected database lives.
//!
//! sift only needs a connection URL. It can live in an environment variable
//! (`database_url_env`, checked first) or inline (`database_url`). TLS and
//! other driver settings go in the URL's query string.

use serde::{Deserialize, Serialize};

use super::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Name of the environment variable holding the connection URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url_env: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,

    #[serde(default)]
    pub pool: ConnectionPoolConfig,
}

/// Pool sizing for the catalog reader. Tables are read one at a time, so a
/// couple of connections is plenty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionPoolConfig {
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u64,
}

impl Default for ConnectionPoolConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            acquire_timeout_seconds: default_acquire_timeout(),
        }
    }
}

fn default_max_connections() -> u32 {
    2
}

fn default_acquire_timeout() -> u64 {
    30
}

impl UpstreamConfig {
    /// Resolve the connection URL. An unset `database_url_env` variable falls
    /// through to the inline URL; having neither is an error.
    pub fn resolve_url(&self) -> Result<String, ConfigError> {
        if let Some(var) = &self.database_url_env {
            match std::env::var(var) {
                Ok(url) if !url.trim().is_empty() => return Ok(url),
                _ if self.database_url.is_none() => {
                    return Err(ConfigError::Config(format!(
                        "environment variable {var} (upstream.database_url_env) is not set"
                    )));
                }
                _ => tracing::debug!(var = %var, "URL variable unset, using upstream.database_url"),
            }
        }

        self.database_url.clone().ok_or_else(|| {
            ConfigError::Config(
                "no upstream database: set upstream.database_url_env or upstream.database_url"
                    .to_string(),
            )
        })
    }

    /// True when the URL is read from the environment rather than the file.
    pub fn url_from_env(&self) -> bool {
        self.database_url_env.is_some()
    }
}
