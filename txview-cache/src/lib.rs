//! Cache store adapter for txview.
//!
//! [`CacheAdapter`] wraps a [`txview_core::CacheStore`] backend and absorbs
//! every store failure: the first one switches caching off for the rest of
//! the process and logs a single warning. Two backends are provided:
//!
//! - [`RedisStore`]: the production key-value store
//! - [`MemoryStore`]: an in-process TTL map, for tests and single-node runs

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod adapter;
mod config;
mod memory;
mod redis_store;

pub use adapter::CacheAdapter;
pub use config::{CacheBackend, CacheConfig};
pub use memory::{MemoryStore, MemoryStoreConfig};
pub use redis_store::RedisStore;
