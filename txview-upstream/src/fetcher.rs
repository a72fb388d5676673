//! reqwest-backed upstream fetcher.

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use txview_core::error::{Result, TxviewError, UpstreamError, UpstreamResult};
use txview_core::traits::UpstreamFetcher;
use txview_core::types::{BlockPage, Payload};

use crate::config::UpstreamConfig;

/// HTTP client for the explorer API.
pub struct HttpFetcher {
    config: UpstreamConfig,
    http_client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(UpstreamConfig::default())
    }

    /// Creates a fetcher with custom configuration.
    pub fn with_config(config: UpstreamConfig) -> Result<Self> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| TxviewError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// The configuration this fetcher was built with.
    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    fn doc_url(base: &str, identifier: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), identifier)
    }

    fn txs_url(base: &str, identifier: &str) -> String {
        format!("{}/txs", Self::doc_url(base, identifier))
    }

    fn classify(&self, err: reqwest::Error) -> UpstreamError {
        if err.is_timeout() {
            UpstreamError::Timeout {
                seconds: self.config.timeout_seconds,
            }
        } else {
            UpstreamError::ConnectionFailed(err.to_string())
        }
    }

    /// Issues one GET and turns the response into a payload.
    async fn get_json(&self, url: &str, query: &[(&'static str, String)]) -> UpstreamResult<Payload> {
        let mut request = self.http_client.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "Upstream returned error status");
            return Err(UpstreamError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        let payload = Payload::from_json_bytes(&body)
            .map_err(|e| UpstreamError::MalformedBody(e.to_string()))?;

        debug!(url, bytes = payload.len(), "Fetched from upstream");
        Ok(payload)
    }
}

#[async_trait]
impl UpstreamFetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch_address_txs(&self, address: &str) -> UpstreamResult<Payload> {
        let url = Self::txs_url(&self.config.address_base_url, address);
        self.get_json(&url, &[]).await
    }

    #[instrument(skip(self))]
    async fn fetch_block_txs(
        &self,
        block_hash: &str,
        page: Option<&BlockPage>,
    ) -> UpstreamResult<Payload> {
        let url = Self::txs_url(&self.config.block_base_url, block_hash);
        let query = page.map(BlockPage::query_pairs).unwrap_or_default();
        self.get_json(&url, &query).await
    }

    #[instrument(skip(self))]
    async fn fetch_tx(&self, txid: &str) -> UpstreamResult<Payload> {
        let url = Self::doc_url(&self.config.tx_base_url, txid);
        self.get_json(&url, &[]).await
    }

    #[instrument(skip(self))]
    async fn fetch_block_info(&self, block_hash: &str) -> UpstreamResult<Payload> {
        let url = Self::doc_url(&self.config.block_base_url, block_hash);
        self.get_json(&url, &[]).await
    }

    async fn probe(&self) -> bool {
        match self.http_client.get(&self.config.address_base_url).send().await {
            Ok(response) => {
                debug!(status = response.status().as_u16(), "Upstream probe answered");
                true
            }
            Err(e) => {
                warn!(error = %e, "Upstream probe failed");
                false
            }
        }
    }
}
