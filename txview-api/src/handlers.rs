//! API route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderName},
    response::{Html, IntoResponse, Response},
    Json,
};
use tracing::debug;

use txview_core::types::{CacheStats, ClearReport, FetchResult};

use crate::dto::*;
use crate::error::ApiError;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

/// Response header naming where a lookup was answered from.
pub const SERVED_FROM_HEADER: HeaderName = HeaderName::from_static("x-txview-served-from");

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Raw upstream JSON, untouched, plus the provenance header.
fn payload_response(result: FetchResult) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/json"),
            (SERVED_FROM_HEADER, result.served_from.as_str()),
        ],
        result.payload.as_str().to_owned(),
    )
        .into_response()
}

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /api/address/:address/txs
pub async fn address_txs(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
    Query(query): Query<LookupQuery>,
) -> Result<Response> {
    let result = state
        .resolver
        .resolve_address(&address, query.force_refresh())
        .await?;
    Ok(payload_response(result))
}

/// GET /api/tx/:txid
pub async fn tx(
    State(state): State<Arc<AppState>>,
    Path(txid): Path<String>,
    Query(query): Query<LookupQuery>,
) -> Result<Response> {
    let result = state
        .resolver
        .resolve_tx(&txid, query.force_refresh())
        .await?;
    Ok(payload_response(result))
}

/// GET /api/block/:hash/info
pub async fn block_info(
    State(state): State<Arc<AppState>>,
    Path(hash): Path<String>,
    Query(query): Query<LookupQuery>,
) -> Result<Response> {
    let result = state
        .resolver
        .resolve_block_info(&hash, query.force_refresh())
        .await?;
    Ok(payload_response(result))
}

/// GET /api/block/:hash/txs
///
/// With `start_index` or `limit` the request is forwarded as a window and
/// the cache is not consulted.
pub async fn block_txs(
    State(state): State<Arc<AppState>>,
    Path(hash): Path<String>,
    Query(query): Query<BlockTxsQuery>,
) -> Result<Response> {
    let result = match query.page()? {
        Some(page) => {
            debug!(?page, "Paginated block request");
            state.resolver.resolve_block_page(&hash, &page).await?
        }
        None => {
            state
                .resolver
                .resolve_block(&hash, query.force_refresh())
                .await?
        }
    };
    Ok(payload_response(result))
}

/// GET /api/cache/stats
pub async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<CacheStats> {
    Json(state.resolver.cache_stats().await)
}

/// POST /api/cache/clear
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<ClearReport> {
    Json(state.resolver.clear_cache().await)
}

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let report = state.resolver.health().await;
    let status = if report.upstream_reachable { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status: status.into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: state.uptime_seconds(),
        upstream_reachable: report.upstream_reachable,
        cache_enabled: report.cache_enabled,
        address_api_url: state.config.upstream.address_base_url.clone(),
        block_api_url: state.config.upstream.block_base_url.clone(),
        tx_api_url: state.config.upstream.tx_base_url.clone(),
    })
}
