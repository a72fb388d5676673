//! # txview Upstream
//!
//! Client for the external explorer API that owns the transaction data.
//! Requests are bounded by a timeout, made exactly once, and every
//! transport failure is folded into [`txview_core::UpstreamError`].

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod config;
mod fetcher;

pub use config::UpstreamConfig;
pub use fetcher::HttpFetcher;
