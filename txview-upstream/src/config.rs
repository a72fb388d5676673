//! Upstream endpoint settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use txview_core::constants::{
    DEFAULT_REQUEST_TIMEOUT_SECONDS, DEFAULT_UPSTREAM_ADDRESS_BASE_URL,
    DEFAULT_UPSTREAM_BLOCK_BASE_URL, DEFAULT_UPSTREAM_TX_BASE_URL,
};
use txview_core::error::{Result, TxviewError};

/// Upstream client configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base endpoint for address lookups; `/{address}/txs` is appended
    pub address_base_url: String,
    /// Base endpoint for block lookups; `/{hash}/txs` is appended for
    /// transactions and `/{hash}` for block info
    pub block_base_url: String,
    /// Base endpoint for transaction lookups; `/{txid}` is appended
    pub tx_base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address_base_url: DEFAULT_UPSTREAM_ADDRESS_BASE_URL.into(),
            block_base_url: DEFAULT_UPSTREAM_BLOCK_BASE_URL.into(),
            tx_base_url: DEFAULT_UPSTREAM_TX_BASE_URL.into(),
            timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECONDS,
        }
    }
}

impl UpstreamConfig {
    /// Config pointing every endpoint at one explorer root, e.g.
    /// `http://explorer:3000` → `http://explorer:3000/address`, `/block`, `/tx`.
    pub fn with_root(root: &str) -> Self {
        let root = root.trim_end_matches('/');
        Self {
            address_base_url: format!("{}/address", root),
            block_base_url: format!("{}/block", root),
            tx_base_url: format!("{}/tx", root),
            ..Default::default()
        }
    }

    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Checks every base URL are absolute http(s) URLs and the timeout is non-zero.
    pub fn validate(&self) -> Result<()> {
        for (name, raw) in [
            ("address_base_url", &self.address_base_url),
            ("block_base_url", &self.block_base_url),
            ("tx_base_url", &self.tx_base_url),
        ] {
            let url = Url::parse(raw)
                .map_err(|e| TxviewError::Config(format!("{} '{}': {}", name, raw, e)))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(TxviewError::Config(format!(
                    "{} must be http or https, got '{}'",
                    name,
                    url.scheme()
                )));
            }
        }
        if self.timeout_seconds == 0 {
            return Err(TxviewError::Config("timeout_seconds must be greater than 0".into()));
        }
        Ok(())
    }
}
