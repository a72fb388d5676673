//! Cache store adapter: the degrade-once policy around a backend.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use txview_core::constants::DEFAULT_CACHE_TTL_SECONDS;
use txview_core::error::TxviewError;
use txview_core::traits::CacheStore;
use txview_core::types::{CacheStats, LookupKey, Namespace, Payload};

use crate::config::{CacheBackend, CacheConfig};
use crate::memory::MemoryStore;
use crate::redis_store::RedisStore;

/// Wraps a cache backend so that no store failure ever reaches a caller.
///
/// The adapter starts enabled only if its backend answered at construction.
/// The first failed operation afterwards flips it to disabled for the rest
/// of the process, logging one warning; there is no reconnection. While
/// disabled, reads miss, writes are dropped, and the backend is not called.
pub struct CacheAdapter {
    store: Option<Arc<dyn CacheStore>>,
    enabled: AtomicBool,
    ttl: Duration,
}

impl fmt::Debug for CacheAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheAdapter")
            .field("backend", &self.store.as_ref().map(|s| s.backend()))
            .field("enabled", &self.is_enabled())
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl CacheAdapter {
    /// Builds the adapter for the configured backend.
    pub async fn from_config(config: &CacheConfig) -> Self {
        match config.backend {
            CacheBackend::Redis => Self::connect(config).await,
            CacheBackend::Memory => {
                info!(ttl_seconds = config.ttl_seconds, "In-memory cache enabled");
                Self::memory(config.ttl())
            }
            CacheBackend::Off => {
                info!("Caching disabled by configuration");
                Self::disabled()
            }
        }
    }

    /// Connects to Redis once. On failure the adapter is built disabled.
    pub async fn connect(config: &CacheConfig) -> Self {
        match RedisStore::connect(config).await {
            Ok(store) => {
                info!(url = store.url(), ttl_seconds = config.ttl_seconds, "Redis cache enabled");
                Self::with_store(Arc::new(store), config.ttl())
            }
            Err(e) => {
                warn!(error = %e, "Redis not available, caching disabled");
                Self::disabled()
            }
        }
    }

    /// Pings `store` once and enables the adapter only if it answers.
    pub async fn with_checked_store(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        match store.ping().await {
            Ok(()) => Self::with_store(store, ttl),
            Err(e) => {
                warn!(backend = store.backend(), error = %e, "Cache store not available, caching disabled");
                Self::disabled()
            }
        }
    }

    /// Wraps a backend already known to be reachable.
    pub fn with_store(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self {
            store: Some(store),
            enabled: AtomicBool::new(true),
            ttl,
        }
    }

    /// An in-process [`MemoryStore`] with the given TTL.
    pub fn memory(ttl: Duration) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), ttl)
    }

    /// An adapter with no backend. Every lookup misses.
    pub fn disabled() -> Self {
        Self {
            store: None,
            enabled: AtomicBool::new(false),
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS),
        }
    }

    /// Whether the cache is serving requests.
    pub fn is_enabled(&self) -> bool {
        self.store.is_some() && self.enabled.load(Ordering::Acquire)
    }

    /// Expiry applied by [`CacheAdapter::set`].
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn live_store(&self) -> Option<&Arc<dyn CacheStore>> {
        if self.enabled.load(Ordering::Acquire) {
            self.store.as_ref()
        } else {
            None
        }
    }

    fn degrade(&self, op: &'static str, err: &TxviewError) {
        if self.enabled.swap(false, Ordering::AcqRel) {
            warn!(
                op,
                backend = self.store.as_ref().map(|s| s.backend()).unwrap_or("none"),
                error = %err,
                "Cache store failed, caching disabled for the rest of this process"
            );
        }
    }

    /// Returns the live payload under `key`. Absent on a miss, an expired
    /// entry, or any store failure.
    pub async fn get(&self, key: &LookupKey) -> Option<Payload> {
        let store = self.live_store()?;
        match store.get(key).await {
            Ok(Some(payload)) => {
                debug!(key = %key, "Cache hit");
                Some(payload)
            }
            Ok(None) => {
                debug!(key = %key, "Cache miss");
                None
            }
            Err(e) => {
                self.degrade("get", &e);
                None
            }
        }
    }

    /// Stores `payload` under `key` with the adapter's TTL.
    pub async fn set(&self, key: &LookupKey, payload: &Payload) {
        self.set_with_ttl(key, payload, self.ttl).await
    }

    /// Stores `payload` under `key` with an explicit TTL. No-op when disabled.
    pub async fn set_with_ttl(&self, key: &LookupKey, payload: &Payload, ttl: Duration) {
        let Some(store) = self.live_store() else {
            return;
        };
        match store.set(key, payload, ttl).await {
            Ok(()) => debug!(key = %key, ttl_seconds = ttl.as_secs(), "Cached"),
            Err(e) => self.degrade("set", &e),
        }
    }

    /// Removes one entry. Returns whether it existed.
    pub async fn delete(&self, key: &LookupKey) -> bool {
        let Some(store) = self.live_store() else {
            return false;
        };
        match store.delete(key).await {
            Ok(existed) => existed,
            Err(e) => {
                self.degrade("delete", &e);
                false
            }
        }
    }

    /// Removes every entry in every namespace. Returns how many were removed;
    /// zero for an empty or disabled cache.
    pub async fn clear_all(&self) -> u64 {
        let Some(store) = self.live_store() else {
            return 0;
        };

        let mut removed = 0;
        for namespace in Namespace::ALL {
            match store.clear_namespace(namespace).await {
                Ok(n) => removed += n,
                Err(e) => {
                    self.degrade("clear", &e);
                    break;
                }
            }
        }

        info!(removed, "Cache cleared");
        removed
    }

    /// Reports status and, when enabled, key count, memory, and hit rate.
    pub async fn stats(&self) -> CacheStats {
        let Some(store) = self.live_store() else {
            return CacheStats::disabled();
        };
        match store.stats().await {
            Ok(stats) => CacheStats::from_store(stats),
            Err(e) => {
                self.degrade("stats", &e);
                CacheStats::disabled()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use txview_core::error::Result;
    use txview_core::types::StoreStats;

    use super::*;

    /// Store whose every operation fails, counting how often it was called.
    #[derive(Default)]
    struct DownStore {
        calls: AtomicUsize,
    }

    impl DownStore {
        fn fail<T>(&self) -> Result<T> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(TxviewError::CacheUnavailable("connection reset".into()))
        }
    }

    #[async_trait]
    impl CacheStore for DownStore {
        fn backend(&self) -> &'static str {
            "down"
        }
        async fn ping(&self) -> Result<()> {
            self.fail()
        }
        async fn get(&self, _key: &LookupKey) -> Result<Option<Payload>> {
            self.fail()
        }
        async fn set(&self, _key: &LookupKey, _payload: &Payload, _ttl: Duration) -> Result<()> {
            self.fail()
        }
        async fn delete(&self, _key: &LookupKey) -> Result<bool> {
            self.fail()
        }
        async fn clear_namespace(&self, _namespace: Namespace) -> Result<u64> {
            self.fail()
        }
        async fn stats(&self) -> Result<StoreStats> {
            self.fail()
        }
    }

    fn key() -> LookupKey {
        LookupKey::address("addr1").unwrap()
    }

    fn payload(text: &str) -> Payload {
        Payload::from_json(text).unwrap()
    }

    #[tokio::test]
    async fn test_round_trip_through_memory() {
        let cache = CacheAdapter::memory(Duration::from_secs(300));
        assert!(cache.is_enabled());
        assert!(cache.get(&key()).await.is_none());

        cache.set(&key(), &payload(r#"["tx1"]"#)).await;
        assert_eq!(cache.get(&key()).await.unwrap().as_str(), r#"["tx1"]"#);
    }

    #[tokio::test]
    async fn test_writes_use_configured_ttl() {
        let store = Arc::new(MemoryStore::new());
        let cache = CacheAdapter::with_store(store.clone(), Duration::from_secs(300));
        cache.set(&key(), &payload("[]")).await;

        let remaining = store.ttl_remaining("address:addr1").unwrap();
        assert!(remaining > Duration::from_secs(290));
        assert!(remaining <= Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_clear_all_counts_every_namespace() {
        let cache = CacheAdapter::memory(Duration::from_secs(300));
        cache.set(&key(), &payload("[]")).await;
        cache.set(&LookupKey::block(&"b".repeat(64)).unwrap(), &payload("[]")).await;

        assert_eq!(cache.clear_all().await, 2);
        assert!(cache.get(&key()).await.is_none());
        assert_eq!(cache.clear_all().await, 0);
    }

    #[tokio::test]
    async fn test_disabled_adapter() {
        let cache = CacheAdapter::disabled();
        assert!(!cache.is_enabled());

        cache.set(&key(), &payload("[]")).await;
        assert!(cache.get(&key()).await.is_none());
        assert!(!cache.delete(&key()).await);
        assert_eq!(cache.clear_all().await, 0);
        assert!(!cache.stats().await.enabled);
    }

    #[tokio::test]
    async fn test_first_failure_disables_for_good() {
        let store = Arc::new(DownStore::default());
        let cache = CacheAdapter::with_store(store.clone(), Duration::from_secs(300));
        assert!(cache.is_enabled());

        assert!(cache.get(&key()).await.is_none());
        assert!(!cache.is_enabled());
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);

        // Backend is no longer consulted.
        cache.set(&key(), &payload("[]")).await;
        cache.get(&key()).await;
        cache.clear_all().await;
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats().await;
        assert!(!stats.enabled);
        assert_eq!(stats.key_count, 0);
    }

    #[tokio::test]
    async fn test_failed_write_degrades_silently() {
        let cache = CacheAdapter::with_store(Arc::new(DownStore::default()), Duration::from_secs(300));
        cache.set(&key(), &payload("[]")).await;
        assert!(!cache.is_enabled());
    }

    #[tokio::test]
    async fn test_checked_store_disabled_when_ping_fails() {
        let cache =
            CacheAdapter::with_checked_store(Arc::new(DownStore::default()), Duration::from_secs(300)).await;
        assert!(!cache.is_enabled());

        let cache =
            CacheAdapter::with_checked_store(Arc::new(MemoryStore::new()), Duration::from_secs(300)).await;
        assert!(cache.is_enabled());
    }

    #[tokio::test]
    async fn test_connect_to_missing_redis_disables() {
        let config = CacheConfig {
            port: 1,
            connect_timeout_ms: 200,
            ..Default::default()
        };
        let cache = CacheAdapter::connect(&config).await;
        assert!(!cache.is_enabled());
        assert!(!cache.stats().await.enabled);
    }

    #[tokio::test]
    async fn test_from_config_backends() {
        let memory = CacheConfig {
            backend: CacheBackend::Memory,
            ..Default::default()
        };
        assert!(CacheAdapter::from_config(&memory).await.is_enabled());

        let off = CacheConfig {
            backend: CacheBackend::Off,
            ..Default::default()
        };
        assert!(!CacheAdapter::from_config(&off).await.is_enabled());
    }

    #[tokio::test]
    async fn test_stats_when_enabled() {
        let cache = CacheAdapter::memory(Duration::from_secs(300));
        cache.set(&key(), &payload(r#"["tx1"]"#)).await;
        cache.get(&key()).await;

        let stats = cache.stats().await;
        assert!(stats.enabled);
        assert_eq!(stats.key_count, 1);
        assert!(stats.memory_bytes > 0);
        assert_eq!(stats.hit_rate, 1.0);
    }
}
