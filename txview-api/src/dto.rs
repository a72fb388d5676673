//! DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use txview_core::types::BlockPage;

use crate::error::ApiError;

/// Query string of the single-document lookups (address txs, tx, block info).
#[derive(Debug, Default, Deserialize)]
pub struct LookupQuery {
    /// `true` (any case) skips the cache read
    pub force_refresh: Option<String>,
}

impl LookupQuery {
    /// Anything but a case-insensitive `true` is false.
    pub fn force_refresh(&self) -> bool {
        is_true(self.force_refresh.as_deref())
    }
}

/// Query string of `GET /api/block/{hash}/txs`.
#[derive(Debug, Default, Deserialize)]
pub struct BlockTxsQuery {
    /// `true` (any case) skips the cache read
    pub force_refresh: Option<String>,
    /// First transaction index to return
    pub start_index: Option<String>,
    /// Maximum number of transactions to return
    pub limit: Option<String>,
}

impl BlockTxsQuery {
    /// Anything but a case-insensitive `true` is false.
    pub fn force_refresh(&self) -> bool {
        is_true(self.force_refresh.as_deref())
    }

    /// The requested window, if either bound was given. Empty values count
    /// as absent.
    pub fn page(&self) -> Result<Option<BlockPage>, ApiError> {
        let page = BlockPage {
            start_index: parse_bound("start_index", self.start_index.as_deref())?,
            limit: parse_bound("limit", self.limit.as_deref())?,
        };
        Ok((!page.is_unbounded()).then_some(page))
    }
}

fn parse_bound(name: &str, raw: Option<&str>) -> Result<Option<u64>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v.parse().map(Some).map_err(|_| {
            ApiError::validation(format!("{} must be a non-negative integer, got '{}'", name, v))
        }),
    }
}

fn is_true(raw: Option<&str>) -> bool {
    raw.map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` when the upstream answers, `degraded` otherwise
    pub status: String,
    /// Crate version
    pub version: String,
    /// Seconds since the server started
    pub uptime_seconds: u64,
    /// Whether the upstream answered the probe
    pub upstream_reachable: bool,
    /// Whether the cache is serving requests
    pub cache_enabled: bool,
    /// Address endpoint in use
    pub address_api_url: String,
    /// Block endpoint in use
    pub block_api_url: String,
    /// Transaction endpoint in use
    pub tx_api_url: String,
}
