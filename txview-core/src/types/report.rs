//! Administrative reports: cache statistics, clear results, health.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw counters reported by a cache store backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Keys held by the store
    pub key_count: u64,
    /// Memory used by the store, in bytes
    pub memory_bytes: u64,
    /// Lookups that found a live entry
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
}

/// Cache statistics, computed on demand and never persisted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Whether the cache is serving requests
    pub enabled: bool,
    /// Number of keys in the store
    pub key_count: u64,
    /// Memory used by the store, in bytes
    pub memory_bytes: u64,
    /// `hits / max(hits + misses, 1)`
    pub hit_rate: f64,
}

impl CacheStats {
    /// Stats for a cache that is switched off.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Stats for a live store.
    pub fn from_store(stats: StoreStats) -> Self {
        let lookups = (stats.hits + stats.misses).max(1);
        Self {
            enabled: true,
            key_count: stats.key_count,
            memory_bytes: stats.memory_bytes,
            hit_rate: stats.hits as f64 / lookups as f64,
        }
    }
}

/// Outcome of clearing the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearReport {
    /// Entries deleted
    pub removed_count: u64,
    /// Whether the cache was enabled when the clear ran
    pub cache_enabled: bool,
}

/// Liveness of the proxy's two dependencies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    /// The upstream answered a probe (any HTTP status counts)
    pub upstream_reachable: bool,
    /// The cache is serving requests
    pub cache_enabled: bool,
    /// When the probe ran
    pub checked_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats::from_store(StoreStats {
            key_count: 3,
            memory_bytes: 1024,
            hits: 3,
            misses: 1,
        });
        assert!(stats.enabled);
        assert_eq!(stats.key_count, 3);
        assert!((stats.hit_rate - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_rate_without_lookups() {
        let stats = CacheStats::from_store(StoreStats::default());
        assert_eq!(stats.hit_rate, 0.0);
    }

    #[test]
    fn test_disabled_stats() {
        let stats = CacheStats::disabled();
        assert!(!stats.enabled);
        assert_eq!(stats.key_count, 0);
        assert_eq!(stats.memory_bytes, 0);
    }
}
