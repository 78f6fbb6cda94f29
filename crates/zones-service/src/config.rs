//! Service configuration from environment.
//!
//! Provider selection happens once here, at startup. Selecting the
//! shared cache without an endpoint is a fatal configuration error,
//! never a degraded runtime mode.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

pub const ENV_CACHE_PROVIDER: &str = "ZONES_CACHE_PROVIDER";
pub const ENV_CACHE_URL: &str = "ZONES_CACHE_URL";
pub const ENV_CACHE_TTL_SECS: &str = "ZONES_CACHE_TTL_SECS";
pub const ENV_CELL_SIZE_DEG: &str = "ZONES_CELL_SIZE_DEG";

const DEFAULT_CACHE_TTL_SECS: u64 = 60;

/// Which cache implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheProvider {
    /// Process-local map, no serialization
    Memory,
    /// Shared Redis store, visible across instances
    Shared,
}

impl FromStr for CacheProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "shared" => Ok(Self::Shared),
            other => Err(ConfigError::InvalidProvider(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("shared cache selected but {ENV_CACHE_URL} is not set")]
    MissingCacheUrl,
    #[error("unknown cache provider '{0}', expected 'memory' or 'shared'")]
    InvalidProvider(String),
    #[error("invalid value '{value}' for {var}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("grid cell size must be a positive number of degrees, got {0}")]
    InvalidCellSize(f64),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub cache_provider: CacheProvider,
    /// Connection endpoint for the shared provider, e.g. redis://host:6379
    pub cache_url: Option<String>,
    pub cache_ttl_secs: u64,
    pub cell_size_deg: f64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key→value lookup. Kept separate from the
    /// process environment so tests stay hermetic.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let cache_provider = match lookup(ENV_CACHE_PROVIDER) {
            Some(raw) => raw.parse()?,
            None => CacheProvider::Memory,
        };

        let cache_url = lookup(ENV_CACHE_URL);
        if cache_provider == CacheProvider::Shared && cache_url.is_none() {
            return Err(ConfigError::MissingCacheUrl);
        }

        let cache_ttl_secs = match lookup(ENV_CACHE_TTL_SECS) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidNumber {
                var: ENV_CACHE_TTL_SECS,
                value: raw,
            })?,
            None => DEFAULT_CACHE_TTL_SECS,
        };

        let cell_size_deg = match lookup(ENV_CELL_SIZE_DEG) {
            Some(raw) => {
                let parsed: f64 = raw.parse().map_err(|_| ConfigError::InvalidNumber {
                    var: ENV_CELL_SIZE_DEG,
                    value: raw,
                })?;
                if !parsed.is_finite() || parsed <= 0.0 {
                    return Err(ConfigError::InvalidCellSize(parsed));
                }
                parsed
            }
            None => zones_core::DEFAULT_CELL_SIZE_DEG,
        };

        Ok(Self {
            cache_provider,
            cache_url,
            cache_ttl_secs,
            cell_size_deg,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_provider: CacheProvider::Memory,
            cache_url: None,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            cell_size_deg: zones_core::DEFAULT_CELL_SIZE_DEG,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |key| map.get(key).map(|v| v.to_string())
    }

    #[test]
    fn defaults_to_memory_provider() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.cache_provider, CacheProvider::Memory);
        assert_eq!(config.cache_ttl_secs, DEFAULT_CACHE_TTL_SECS);
        assert_eq!(config.cell_size_deg, zones_core::DEFAULT_CELL_SIZE_DEG);
    }

    #[test]
    fn shared_without_endpoint_is_fatal() {
        let err = Config::from_lookup(lookup(&[(ENV_CACHE_PROVIDER, "shared")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCacheUrl));
    }

    #[test]
    fn shared_with_endpoint_parses() {
        let config = Config::from_lookup(lookup(&[
            (ENV_CACHE_PROVIDER, "shared"),
            (ENV_CACHE_URL, "redis://localhost:6379"),
            (ENV_CACHE_TTL_SECS, "300"),
        ]))
        .unwrap();
        assert_eq!(config.cache_provider, CacheProvider::Shared);
        assert_eq!(config.cache_url.as_deref(), Some("redis://localhost:6379"));
        assert_eq!(config.cache_ttl_secs, 300);
    }

    #[test]
    fn rejects_unknown_provider() {
        let err = Config::from_lookup(lookup(&[(ENV_CACHE_PROVIDER, "memcached")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidProvider(_)));
    }

    #[test]
    fn rejects_nonpositive_cell_size() {
        for bad in ["0", "-0.5"] {
            let err = Config::from_lookup(lookup(&[(ENV_CELL_SIZE_DEG, bad)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidCellSize(_)), "{bad}");
        }
        let err = Config::from_lookup(lookup(&[(ENV_CACHE_TTL_SECS, "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));
    }
}
