//! Cache-aside resolution of explorer lookups.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, instrument, warn};

use txview_cache::CacheAdapter;
use txview_core::error::{Result, TxviewError};
use txview_core::traits::UpstreamFetcher;
use txview_core::types::{
    BlockPage, CacheStats, ClearReport, FetchResult, HealthReport, LookupKey, Namespace,
};
use txview_upstream::HttpFetcher;

use crate::config::ProxyConfig;

/// Orchestrates the cache and the upstream for every lookup.
///
/// Holds no mutable state of its own. Each call is independent and may run
/// concurrently with others; two concurrent misses on one key both fetch and
/// both write, and the last write wins.
pub struct CacheAsideResolver {
    cache: CacheAdapter,
    upstream: Arc<dyn UpstreamFetcher>,
}

impl CacheAsideResolver {
    /// Wires a resolver from already-built collaborators.
    pub fn new(cache: CacheAdapter, upstream: Arc<dyn UpstreamFetcher>) -> Self {
        Self { cache, upstream }
    }

    /// Builds the HTTP fetcher and connects the cache (once) from `config`.
    pub async fn from_config(config: &ProxyConfig) -> Result<Self> {
        let upstream = HttpFetcher::with_config(config.upstream.clone())?;
        let cache = CacheAdapter::from_config(&config.cache).await;
        Ok(Self::new(cache, Arc::new(upstream)))
    }

    /// The cache adapter in use.
    pub fn cache(&self) -> &CacheAdapter {
        &self.cache
    }

    /// Looks up `identifier` in `namespace`.
    ///
    /// 1. Validate and normalize; a malformed identifier fails before any I/O.
    /// 2. Unless `force_refresh`, answer from the cache on a hit.
    /// 3. Otherwise fetch upstream once, write the payload back with the
    ///    cache TTL, and answer from the upstream.
    ///
    /// Upstream errors are returned as-is and nothing is cached for them.
    #[instrument(skip(self), fields(key = tracing::field::Empty))]
    pub async fn resolve(
        &self,
        namespace: Namespace,
        identifier: &str,
        force_refresh: bool,
    ) -> Result<FetchResult> {
        let key = LookupKey::new(namespace, identifier)?;
        tracing::Span::current().record("key", key.as_str());

        if !force_refresh {
            if let Some(payload) = self.cache.get(&key).await {
                info!(served_from = "cache", "Resolved");
                return Ok(FetchResult::from_cache(payload));
            }
        }

        let started = Instant::now();
        let payload = self.upstream.fetch(&key).await.map_err(|e| {
            warn!(kind = e.kind(), error = %e, "Upstream fetch failed");
            TxviewError::Upstream(e)
        })?;

        self.cache.set(&key, &payload).await;

        info!(
            served_from = "upstream",
            elapsed_ms = started.elapsed().as_millis() as u64,
            bytes = payload.len(),
            "Resolved"
        );
        Ok(FetchResult::from_upstream(payload))
    }

    /// [`CacheAsideResolver::resolve`] in the address namespace.
    pub async fn resolve_address(&self, address: &str, force_refresh: bool) -> Result<FetchResult> {
        self.resolve(Namespace::Address, address, force_refresh).await
    }

    /// [`CacheAsideResolver::resolve`] in the block namespace.
    pub async fn resolve_block(&self, block_hash: &str, force_refresh: bool) -> Result<FetchResult> {
        self.resolve(Namespace::Block, block_hash, force_refresh).await
    }

    /// [`CacheAsideResolver::resolve`] in the transaction namespace.
    pub async fn resolve_tx(&self, txid: &str, force_refresh: bool) -> Result<FetchResult> {
        self.resolve(Namespace::Tx, txid, force_refresh).await
    }

    /// [`CacheAsideResolver::resolve`] in the block-info namespace.
    pub async fn resolve_block_info(&self, block_hash: &str, force_refresh: bool) -> Result<FetchResult> {
        self.resolve(Namespace::BlockInfo, block_hash, force_refresh).await
    }

    /// Fetches a window of a block's transactions.
    ///
    /// A window is a partial view of the cached document, so it is neither
    /// read from nor written to the cache. An unbounded page is forwarded
    /// without query parameters.
    #[instrument(skip(self))]
    pub async fn resolve_block_page(&self, block_hash: &str, page: &BlockPage) -> Result<FetchResult> {
        let key = LookupKey::block(block_hash)?;

        let payload = self
            .upstream
            .fetch_block_txs(key.identifier(), Some(page))
            .await
            .map_err(|e| {
                warn!(kind = e.kind(), error = %e, "Upstream fetch failed");
                TxviewError::Upstream(e)
            })?;

        Ok(FetchResult::from_upstream(payload))
    }

    /// Removes every cached entry across all namespaces.
    pub async fn clear_cache(&self) -> ClearReport {
        let cache_enabled = self.cache.is_enabled();
        let removed_count = self.cache.clear_all().await;
        ClearReport {
            removed_count,
            cache_enabled: cache_enabled && self.cache.is_enabled(),
        }
    }

    /// Cache status and usage.
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Probes the upstream and reports the cache flag.
    pub async fn health(&self) -> HealthReport {
        let upstream_reachable = self.upstream.probe().await;
        HealthReport {
            upstream_reachable,
            cache_enabled: self.cache.is_enabled(),
            checked_at: Utc::now(),
        }
    }
}
