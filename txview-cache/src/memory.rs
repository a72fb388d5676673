//! In-memory TTL store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use txview_core::error::Result;
use txview_core::traits::CacheStore;
use txview_core::types::{LookupKey, Namespace, Payload, StoreStats};

/// Cache entry with TTL.
#[derive(Clone)]
struct CacheEntry {
    payload: Payload,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.stored_at.elapsed() >= self.ttl
    }
}

/// Memory store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MemoryStoreConfig {
    /// Maximum number of entries
    pub max_entries: usize,
    /// Whether to drop expired entries when the store fills up
    pub auto_cleanup: bool,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            auto_cleanup: true,
        }
    }
}

/// In-process key-value store with per-entry expiry.
///
/// Thread-safe. Expired entries read as absent and are swept lazily when
/// the store reaches capacity; past that the oldest entry is evicted.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
    config: MemoryStoreConfig,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryStore {
    /// Creates a store with default configuration.
    pub fn new() -> Self {
        Self::with_config(MemoryStoreConfig::default())
    }

    /// Creates a store with custom configuration.
    pub fn with_config(config: MemoryStoreConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the live payload under `key`.
    pub fn get_entry(&self, key: &str) -> Option<Payload> {
        let found = self
            .entries
            .read()
            .get(key)
            .filter(|e| !e.is_expired())
            .map(|e| e.payload.clone());

        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Stores `payload` under `key` for `ttl`.
    pub fn set_entry(&self, key: &str, payload: Payload, ttl: Duration) {
        let mut entries = self.entries.write();

        if !entries.contains_key(key) {
            if self.config.auto_cleanup && entries.len() >= self.config.max_entries {
                entries.retain(|_, e| !e.is_expired());
            }
            if entries.len() >= self.config.max_entries {
                if let Some(oldest_key) = entries
                    .iter()
                    .min_by_key(|(_, e)| e.stored_at)
                    .map(|(k, _)| k.clone())
                {
                    entries.remove(&oldest_key);
                }
            }
        }

        entries.insert(
            key.to_string(),
            CacheEntry {
                payload,
                stored_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Returns the remaining lifetime of a live entry.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        self.entries
            .read()
            .get(key)
            .filter(|e| !e.is_expired())
            .map(|e| e.ttl.saturating_sub(e.stored_at.elapsed()))
    }

    /// Removes all expired entries.
    pub fn cleanup_expired(&self) {
        self.entries.write().retain(|_, e| !e.is_expired());
    }

    /// Returns the number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the store holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn get(&self, key: &LookupKey) -> Result<Option<Payload>> {
        Ok(self.get_entry(key.as_str()))
    }

    async fn set(&self, key: &LookupKey, payload: &Payload, ttl: Duration) -> Result<()> {
        self.set_entry(key.as_str(), payload.clone(), ttl);
        Ok(())
    }

    async fn delete(&self, key: &LookupKey) -> Result<bool> {
        Ok(self.entries.write().remove(key.as_str()).is_some())
    }

    async fn clear_namespace(&self, namespace: Namespace) -> Result<u64> {
        let prefix = namespace.key_pattern();
        let prefix = prefix.trim_end_matches('*');

        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|k, _| !k.starts_with(prefix));
        Ok((before - entries.len()) as u64)
    }

    async fn stats(&self) -> Result<StoreStats> {
        let entries = self.entries.read();
        let live = entries.iter().filter(|(_, e)| !e.is_expired());
        let (key_count, memory_bytes) = live.fold((0u64, 0u64), |(n, bytes), (k, e)| {
            (n + 1, bytes + (k.len() + e.payload.len()) as u64)
        });

        Ok(StoreStats {
            key_count,
            memory_bytes,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(text: &str) -> Payload {
        Payload::from_json(text).unwrap()
    }

    #[test]
    fn test_set_get() {
        let store = MemoryStore::new();
        store.set_entry("address:addr1", payload(r#"["tx1"]"#), Duration::from_secs(300));
        assert_eq!(store.get_entry("address:addr1").unwrap().as_str(), r#"["tx1"]"#);
    }

    #[test]
    fn test_miss() {
        let store = MemoryStore::new();
        assert!(store.get_entry("address:nobody").is_none());
    }

    #[test]
    fn test_empty_payload_is_a_hit() {
        let store = MemoryStore::new();
        store.set_entry("address:addr1", payload("[]"), Duration::from_secs(300));
        assert!(store.get_entry("address:addr1").is_some());
    }

    #[test]
    fn test_ttl_expiration() {
        let store = MemoryStore::new();
        store.set_entry("address:addr1", payload("[]"), Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(10));
        assert!(store.get_entry("address:addr1").is_none());
    }

    #[test]
    fn test_ttl_remaining() {
        let store = MemoryStore::new();
        store.set_entry("address:addr1", payload("[]"), Duration::from_secs(300));
        let remaining = store.ttl_remaining("address:addr1").unwrap();
        assert!(remaining <= Duration::from_secs(300));
        assert!(remaining > Duration::from_secs(290));
    }

    #[test]
    fn test_capacity_eviction() {
        let store = MemoryStore::with_config(MemoryStoreConfig {
            max_entries: 2,
            auto_cleanup: true,
        });
        store.set_entry("address:a", payload("[]"), Duration::from_secs(300));
        store.set_entry("address:b", payload("[]"), Duration::from_secs(300));
        store.set_entry("address:c", payload("[]"), Duration::from_secs(300));
        assert_eq!(store.len(), 2);
        assert!(store.get_entry("address:c").is_some());
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let store = MemoryStore::with_config(MemoryStoreConfig {
            max_entries: 2,
            auto_cleanup: true,
        });
        store.set_entry("address:a", payload("[]"), Duration::from_secs(300));
        store.set_entry("address:b", payload("[]"), Duration::from_secs(300));
        store.set_entry("address:b", payload("[1]"), Duration::from_secs(300));
        assert!(store.get_entry("address:a").is_some());
        assert_eq!(store.get_entry("address:b").unwrap().as_str(), "[1]");
    }

    #[test]
    fn test_cleanup_expired() {
        let store = MemoryStore::new();
        store.set_entry("address:a", payload("[]"), Duration::from_millis(1));
        store.set_entry("address:b", payload("[]"), Duration::from_secs(300));
        std::thread::sleep(Duration::from_millis(10));
        store.cleanup_expired();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_namespace_leaves_others() {
        let store = MemoryStore::new();
        let ttl = Duration::from_secs(300);
        store.set_entry("address:a", payload("[]"), ttl);
        store.set_entry("address:b", payload("[]"), ttl);
        store.set_entry("block:c", payload("[]"), ttl);
        store.set_entry("price:usd", payload("1"), ttl);

        assert_eq!(store.clear_namespace(Namespace::Address).await.unwrap(), 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.clear_namespace(Namespace::Address).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_stats_counts_hits_and_misses() {
        let store = MemoryStore::new();
        let key = LookupKey::address("addr1").unwrap();
        store.set(&key, &payload(r#"["tx1"]"#), Duration::from_secs(300)).await.unwrap();

        store.get(&key).await.unwrap();
        store.get(&key).await.unwrap();
        store.get(&LookupKey::address("addr2").unwrap()).await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.key_count, 1);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.memory_bytes, ("address:addr1".len() + r#"["tx1"]"#.len()) as u64);
    }
}
