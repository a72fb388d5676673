//! # txview Proxy
//!
//! The cache-aside policy that sits between request handlers and the
//! explorer API.
//!
//! A lookup validates its identifier, reads the cache unless a refresh is
//! forced, and on a miss fetches upstream and writes the result back with a
//! fixed TTL. Upstream errors pass through untouched and are never cached;
//! cache failures are absorbed, so a lookup behaves the same with or
//! without a working cache.
//!
//! ## Example
//!
//! ```rust,ignore
//! use txview_proxy::{CacheAsideResolver, ProxyConfig};
//! use txview_core::Namespace;
//!
//! let resolver = CacheAsideResolver::from_config(&ProxyConfig::from_env()?).await?;
//! let result = resolver.resolve(Namespace::Address, "bc1q...", false).await?;
//! println!("{} ({})", result.payload, result.served_from);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod config;
mod resolver;

pub use config::ProxyConfig;
pub use resolver::CacheAsideResolver;
