//! Cache connection settings.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use txview_core::constants::{
    DEFAULT_CACHE_CONNECT_TIMEOUT_MS, DEFAULT_CACHE_DB_INDEX, DEFAULT_CACHE_HOST,
    DEFAULT_CACHE_PORT, DEFAULT_CACHE_TTL_SECONDS,
};
use txview_core::error::TxviewError;

/// Which store backs the cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Redis at `host:port/db_index`
    #[default]
    Redis,
    /// In-process map, lost on restart
    Memory,
    /// No cache; every lookup goes upstream
    Off,
}

impl fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CacheBackend::Redis => "redis",
            CacheBackend::Memory => "memory",
            CacheBackend::Off => "off",
        })
    }
}

impl FromStr for CacheBackend {
    type Err = TxviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(CacheBackend::Redis),
            "memory" => Ok(CacheBackend::Memory),
            "off" | "none" | "disabled" => Ok(CacheBackend::Off),
            other => Err(TxviewError::Config(format!(
                "unknown cache backend '{}' (expected redis, memory, or off)",
                other
            ))),
        }
    }
}

/// Cache configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Store backing the cache
    pub backend: CacheBackend,
    /// Key-value store host
    pub host: String,
    /// Key-value store port
    pub port: u16,
    /// Logical database index
    pub db_index: i64,
    /// Expiry applied to every write, in seconds
    pub ttl_seconds: u64,
    /// Budget for the startup connection, and for each later operation, in milliseconds
    pub connect_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            host: DEFAULT_CACHE_HOST.into(),
            port: DEFAULT_CACHE_PORT,
            db_index: DEFAULT_CACHE_DB_INDEX,
            ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
            connect_timeout_ms: DEFAULT_CACHE_CONNECT_TIMEOUT_MS,
        }
    }
}

impl CacheConfig {
    /// Connection URL, e.g. `redis://127.0.0.1:6379/0`.
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db_index)
    }

    /// Expiry as a duration.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    /// Connection / operation timeout as a duration.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}
