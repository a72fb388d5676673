//! Process-wide configuration, resolved once at startup.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use txview_cache::CacheConfig;
use txview_core::error::{Result, TxviewError};
use txview_upstream::UpstreamConfig;

/// Everything the orchestrator needs to build its collaborators.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Key-value store connection and TTL
    pub cache: CacheConfig,
    /// Explorer API endpoints and timeout
    pub upstream: UpstreamConfig,
}

impl ProxyConfig {
    /// Reads the process environment, after loading `.env` if present.
    ///
    /// Unset variables keep their defaults; a set variable that does not
    /// parse is an error rather than a silent fallback.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let cache = CacheConfig {
            backend: parse_var(&lookup, "CACHE_BACKEND", defaults.cache.backend)?,
            host: lookup("CACHE_HOST").unwrap_or(defaults.cache.host),
            port: parse_var(&lookup, "CACHE_PORT", defaults.cache.port)?,
            db_index: parse_var(&lookup, "CACHE_DB_INDEX", defaults.cache.db_index)?,
            ttl_seconds: parse_var(&lookup, "CACHE_TTL_SECONDS", defaults.cache.ttl_seconds)?,
            connect_timeout_ms: parse_var(
                &lookup,
                "CACHE_CONNECT_TIMEOUT_MS",
                defaults.cache.connect_timeout_ms,
            )?,
        };

        let upstream = UpstreamConfig {
            address_base_url: lookup("UPSTREAM_ADDRESS_BASE_URL")
                .unwrap_or(defaults.upstream.address_base_url),
            block_base_url: lookup("UPSTREAM_BLOCK_BASE_URL")
                .unwrap_or(defaults.upstream.block_base_url),
            tx_base_url: lookup("UPSTREAM_TX_BASE_URL").unwrap_or(defaults.upstream.tx_base_url),
            timeout_seconds: parse_var(
                &lookup,
                "REQUEST_TIMEOUT_SECONDS",
                defaults.upstream.timeout_seconds,
            )?,
        };
        upstream.validate()?;

        Ok(Self { cache, upstream })
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| TxviewError::Config(format!("{}='{}': {}", name, raw, e))),
        None => Ok(default),
    }
}
