//! App state: resolver, config, start time.

use std::time::Instant;

use txview_core::error::Result;
use txview_proxy::{CacheAsideResolver, ProxyConfig};

/// Shared state behind every handler.
pub struct AppState {
    /// Configuration the resolver was built from
    pub config: ProxyConfig,
    /// Cache-aside lookups
    pub resolver: CacheAsideResolver,
    /// Server start time
    pub started_at: Instant,
}

impl AppState {
    /// Wraps an already-built resolver.
    pub fn new(config: ProxyConfig, resolver: CacheAsideResolver) -> Self {
        Self {
            config,
            resolver,
            started_at: Instant::now(),
        }
    }

    /// Builds the resolver from `config`, connecting the cache once.
    pub async fn from_config(config: ProxyConfig) -> Result<Self> {
        let resolver = CacheAsideResolver::from_config(&config).await?;
        Ok(Self::new(config, resolver))
    }

    /// Seconds since the state was created.
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
