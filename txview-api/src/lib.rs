//! # txview API Server
//!
//! HTTP surface of the caching proxy plus a single-page viewer.
//!
//! ## Endpoints
//!
//! - `GET /` - Viewer page
//! - `GET /api/address/:address/txs` - Address transactions (`?force_refresh=true`)
//! - `GET /api/block/:hash/txs` - Block transactions (`?force_refresh=true`, `start_index`, `limit`)
//! - `GET /api/block/:hash/info` - Block summary (`?force_refresh=true`)
//! - `GET /api/tx/:txid` - Single transaction (`?force_refresh=true`)
//! - `GET /api/cache/stats` - Cache statistics
//! - `POST /api/cache/clear` - Drop every cached lookup
//! - `GET /health` - Liveness of upstream and cache
//!
//! ## Example
//!
//! ```rust,ignore
//! use txview_api::ApiServer;
//! use txview_proxy::ProxyConfig;
//!
//! let server = ApiServer::from_config(ProxyConfig::from_env()?).await?;
//! server.run(([0, 0, 0, 0], 5000)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod dto;
mod error;
mod handlers;
mod routes;
mod state;

pub use dto::HealthResponse;
pub use error::ApiError;
pub use handlers::SERVED_FROM_HEADER;
pub use routes::create_router;
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use txview_core::error::Result;
use txview_proxy::ProxyConfig;

/// API server for txview.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a server around prepared state.
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Builds the resolver from `config` and wraps it in a server.
    pub async fn from_config(config: ProxyConfig) -> Result<Self> {
        Ok(Self::new(AppState::from_config(config).await?))
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!(
            %addr,
            address_api = %self.state.config.upstream.address_base_url,
            block_api = %self.state.config.upstream.block_base_url,
            cache_enabled = self.state.resolver.cache().is_enabled(),
            "txview API server listening"
        );

        axum::serve(listener, self.router()).await
    }
}
