//! Redis-backed cache store.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, ErrorKind, InfoDict, RedisError, RedisResult};
use tracing::{debug, info, warn};

use txview_core::error::{Result, TxviewError};
use txview_core::traits::CacheStore;
use txview_core::types::{LookupKey, Namespace, Payload, StoreStats};

use crate::config::CacheConfig;

/// Keys deleted per DEL round trip when clearing a namespace.
const DELETE_BATCH: usize = 500;

/// Cache store backed by a Redis database.
///
/// Uses a `ConnectionManager`, which is cheap to clone and safe to share
/// between concurrent requests. Every operation is bounded by the configured
/// timeout so a wedged server cannot stall a request.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    url: String,
    op_timeout: Duration,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("url", &self.url)
            .field("op_timeout", &self.op_timeout)
            .field("conn", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisStore {
    /// Connects and pings once, giving up after `connect_timeout_ms`.
    pub async fn connect(config: &CacheConfig) -> Result<Self> {
        let url = config.redis_url();
        let op_timeout = config.connect_timeout();
        info!(url = %url, "Connecting to Redis");

        let client = redis::Client::open(url.as_str()).map_err(|e| {
            TxviewError::CacheUnavailable(format!("invalid Redis URL {}: {}", url, e))
        })?;

        let conn = match tokio::time::timeout(op_timeout, ConnectionManager::new(client)).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => {
                return Err(TxviewError::CacheUnavailable(format!(
                    "Redis connection to {} failed: {}",
                    url, e
                )))
            }
            Err(_) => {
                return Err(TxviewError::CacheUnavailable(format!(
                    "Redis connection to {} timed out after {}ms",
                    url, config.connect_timeout_ms
                )))
            }
        };

        let store = Self {
            conn,
            url,
            op_timeout,
        };
        store.ping().await?;
        Ok(store)
    }

    /// Connection URL this store talks to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Runs `fut` under the operation timeout. Only the timeout is mapped;
    /// the Redis reply is handed back for the caller to classify.
    async fn bounded_reply<T, F>(&self, op: &'static str, fut: F) -> Result<RedisResult<T>>
    where
        F: Future<Output = RedisResult<T>>,
    {
        tokio::time::timeout(self.op_timeout, fut).await.map_err(|_| {
            TxviewError::CacheUnavailable(format!(
                "Redis {} timed out after {}ms",
                op,
                self.op_timeout.as_millis()
            ))
        })
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        self.bounded_reply(op, fut)
            .await?
            .map_err(|e| TxviewError::CacheUnavailable(format!("Redis {} error: {}", op, e)))
    }
}

/// True when the error concerns one entry (wrong type, undecodable value,
/// error reply) rather than the server or the connection.
fn is_entry_error(err: &RedisError) -> bool {
    if err.is_io_error() || err.is_connection_dropped() || err.is_timeout() {
        return false;
    }
    matches!(
        err.kind(),
        ErrorKind::TypeError | ErrorKind::ResponseError | ErrorKind::ExtensionError
    )
}

#[async_trait]
impl CacheStore for RedisStore {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let reply: String = self
            .bounded("PING", redis::cmd("PING").query_async(&mut conn))
            .await?;
        debug!(reply = %reply, "Redis PING");
        Ok(())
    }

    async fn get(&self, key: &LookupKey) -> Result<Option<Payload>> {
        let mut conn = self.conn.clone();
        let reply: RedisResult<Option<String>> =
            self.bounded_reply("GET", conn.get(key.as_str())).await?;

        let raw = match reply {
            Ok(raw) => raw,
            Err(e) if is_entry_error(&e) => {
                warn!(key = %key, error = %e, "Unreadable cache entry, treating as a miss");
                return Ok(None);
            }
            Err(e) => {
                return Err(TxviewError::CacheUnavailable(format!("Redis GET error: {}", e)));
            }
        };

        match raw {
            Some(text) => match Payload::from_json(text) {
                Ok(payload) => Ok(Some(payload)),
                Err(e) => {
                    warn!(key = %key, error = %e, "Discarding unreadable cache entry");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn set(&self, key: &LookupKey, payload: &Payload, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        let seconds = ttl.as_secs().max(1);
        self.bounded::<(), _>("SETEX", conn.set_ex(key.as_str(), payload.as_str(), seconds))
            .await
    }

    async fn delete(&self, key: &LookupKey) -> Result<bool> {
        let mut conn = self.conn.clone();
        let removed: u64 = self.bounded("DEL", conn.del(key.as_str())).await?;
        Ok(removed > 0)
    }

    async fn clear_namespace(&self, namespace: Namespace) -> Result<u64> {
        let mut conn = self.conn.clone();
        let pattern = namespace.key_pattern();

        let scan = async {
            let mut iter = conn.scan_match::<_, String>(&pattern).await?;
            let mut keys = Vec::new();
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
            Ok::<_, redis::RedisError>(keys)
        };
        let keys = self.bounded("SCAN", scan).await?;

        let mut removed = 0u64;
        for batch in keys.chunks(DELETE_BATCH) {
            let mut conn = self.conn.clone();
            let n: u64 = self.bounded("DEL", conn.del(batch)).await?;
            removed += n;
        }

        debug!(namespace = %namespace, removed, "Cleared namespace");
        Ok(removed)
    }

    async fn stats(&self) -> Result<StoreStats> {
        let mut conn = self.conn.clone();
        let key_count: u64 = self
            .bounded("DBSIZE", redis::cmd("DBSIZE").query_async(&mut conn))
            .await?;
        let info: InfoDict = self
            .bounded("INFO", redis::cmd("INFO").query_async(&mut conn))
            .await?;

        Ok(StoreStats {
            key_count,
            memory_bytes: info.get("used_memory").unwrap_or(0),
            hits: info.get("keyspace_hits").unwrap_or(0),
            misses: info.get("keyspace_misses").unwrap_or(0),
        })
    }
}
