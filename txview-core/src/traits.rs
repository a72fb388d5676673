//! Common traits for txview.
//!
//! These are the seams between the orchestrator and its two collaborators,
//! so that the cache backend and the upstream client can be swapped (and
//! doubled in tests) without touching the cache-aside policy.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Result, UpstreamResult};
use crate::types::{BlockPage, LookupKey, Namespace, Payload, StoreStats};

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE STORE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// A key-value store with per-entry expiry.
///
/// Implementations report failures as [`crate::TxviewError::CacheUnavailable`];
/// deciding what a failure means for the process is the adapter's job, not
/// the store's. Expiry is passive: an expired entry simply reads as absent.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Short backend name for logs (`"redis"`, `"memory"`).
    fn backend(&self) -> &'static str;

    /// Checks the store is reachable.
    async fn ping(&self) -> Result<()>;

    /// Returns the live payload under `key`, if any.
    async fn get(&self, key: &LookupKey) -> Result<Option<Payload>>;

    /// Stores `payload` under `key`, expiring after `ttl`.
    async fn set(&self, key: &LookupKey, payload: &Payload, ttl: Duration) -> Result<()>;

    /// Removes one entry. Returns whether it existed.
    async fn delete(&self, key: &LookupKey) -> Result<bool>;

    /// Removes every entry in `namespace`. Returns how many were removed.
    async fn clear_namespace(&self, namespace: Namespace) -> Result<u64>;

    /// Reports key count, memory use, and hit/miss counters.
    async fn stats(&self) -> Result<StoreStats>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// UPSTREAM FETCHER TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Client for the external explorer API.
///
/// One attempt per call; no retries. Identifiers passed in are already
/// validated and normalized.
#[async_trait]
pub trait UpstreamFetcher: Send + Sync {
    /// Fetches the transactions touching `address`.
    async fn fetch_address_txs(&self, address: &str) -> UpstreamResult<Payload>;

    /// Fetches the transactions in `block_hash`, optionally a window of them.
    async fn fetch_block_txs(
        &self,
        block_hash: &str,
        page: Option<&BlockPage>,
    ) -> UpstreamResult<Payload>;

    /// Fetches one transaction by id.
    async fn fetch_tx(&self, txid: &str) -> UpstreamResult<Payload>;

    /// Fetches the header fields of `block_hash`.
    async fn fetch_block_info(&self, block_hash: &str) -> UpstreamResult<Payload>;

    /// Returns true if the upstream answers at all.
    async fn probe(&self) -> bool;

    /// Fetches the full, unpaginated document for `key`.
    async fn fetch(&self, key: &LookupKey) -> UpstreamResult<Payload> {
        let id = key.identifier();
        match key.namespace() {
            Namespace::Address => self.fetch_address_txs(id).await,
            Namespace::Block => self.fetch_block_txs(id, None).await,
            Namespace::Tx => self.fetch_tx(id).await,
            Namespace::BlockInfo => self.fetch_block_info(id).await,
        }
    }
}
