//! API route configuration.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Viewer
        .route("/", get(handlers::index))

        // Health check
        .route("/health", get(handlers::health_check))

        // Lookups
        .route("/api/address/:address/txs", get(handlers::address_txs))
        .route("/api/block/:hash/txs", get(handlers::block_txs))
        .route("/api/block/:hash/info", get(handlers::block_info))
        .route("/api/tx/:txid", get(handlers::tx))

        // Cache administration
        .route("/api/cache/stats", get(handlers::cache_stats))
        .route("/api/cache/clear", post(handlers::clear_cache))

        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, Response, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use txview_cache::{CacheBackend, CacheConfig};
    use txview_proxy::ProxyConfig;
    use txview_upstream::UpstreamConfig;

    use crate::handlers::SERVED_FROM_HEADER;

    const HASH: &str = "000000000000000000024bead8df69990852c202db0e0097c1a12ea637d7e96d";
    const TXID: &str = "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b";

    async fn test_app(upstream_root: &str) -> Router {
        let config = ProxyConfig {
            cache: CacheConfig {
                backend: CacheBackend::Memory,
                ..Default::default()
            },
            upstream: UpstreamConfig::with_root(upstream_root),
        };
        let state = AppState::from_config(config).await.unwrap();
        create_router(Arc::new(state))
    }

    async fn send(app: &Router, method: &str, uri: &str) -> Response<Body> {
        app.clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response<Body>) -> Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    fn served_from(response: &Response<Body>) -> &str {
        response.headers()[&SERVED_FROM_HEADER].to_str().unwrap()
    }

    #[tokio::test]
    async fn test_index_page() {
        let app = test_app("http://127.0.0.1:1").await;
        let response = send(&app, "GET", "/").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("<html"));
    }

    #[tokio::test]
    async fn test_address_lookup_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/address/addr1/txs"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"txid":"tx1"}]"#))
            .expect(1)
            .mount(&server)
            .await;
        let app = test_app(&server.uri()).await;

        let first = send(&app, "GET", "/api/address/addr1/txs").await;
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(served_from(&first), "upstream");
        assert_eq!(first.headers()["content-type"], "application/json");
        assert_eq!(body_text(first).await, r#"[{"txid":"tx1"}]"#);

        let second = send(&app, "GET", "/api/address/addr1/txs").await;
        assert_eq!(served_from(&second), "cache");
        assert_eq!(body_text(second).await, r#"[{"txid":"tx1"}]"#);
    }

    #[tokio::test]
    async fn test_force_refresh_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/address/addr1/txs"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(2)
            .mount(&server)
            .await;
        let app = test_app(&server.uri()).await;

        send(&app, "GET", "/api/address/addr1/txs").await;
        let forced = send(&app, "GET", "/api/address/addr1/txs?force_refresh=TRUE").await;
        assert_eq!(served_from(&forced), "upstream");

        let not_forced = send(&app, "GET", "/api/address/addr1/txs?force_refresh=1").await;
        assert_eq!(served_from(&not_forced), "cache");
    }

    #[tokio::test]
    async fn test_invalid_block_hash_is_400() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(0)
            .mount(&server)
            .await;
        let app = test_app(&server.uri()).await;

        let response = send(&app, "GET", "/api/block/abc123/txs").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_bad_page_bounds_are_400() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(0)
            .mount(&server)
            .await;
        let app = test_app(&server.uri()).await;

        for query in ["start_index=abc", "limit=-5"] {
            let uri = format!("/api/block/{}/txs?{}", HASH, query);
            let response = send(&app, "GET", &uri).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(response.headers()["content-type"], "application/json");

            let body = body_json(response).await;
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn test_tx_lookup_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/tx/{}", TXID)))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"txid":"t"}"#))
            .expect(1)
            .mount(&server)
            .await;
        let app = test_app(&server.uri()).await;

        let uri = format!("/api/tx/{}", TXID.to_uppercase());
        let first = send(&app, "GET", &uri).await;
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(served_from(&first), "upstream");
        assert_eq!(body_text(first).await, r#"{"txid":"t"}"#);

        let second = send(&app, "GET", &format!("/api/tx/{}", TXID)).await;
        assert_eq!(served_from(&second), "cache");

        let invalid = send(&app, "GET", "/api/tx/deadbeef").await;
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(invalid).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_block_info_cached_apart_from_block_txs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/block/{}", HASH)))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"height":1}"#))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/block/{}/txs", HASH)))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"["tx1"]"#))
            .expect(1)
            .mount(&server)
            .await;
        let app = test_app(&server.uri()).await;

        let info_uri = format!("/api/block/{}/info", HASH);
        let txs_uri = format!("/api/block/{}/txs", HASH);

        let info = send(&app, "GET", &info_uri).await;
        assert_eq!(served_from(&info), "upstream");
        assert_eq!(body_text(info).await, r#"{"height":1}"#);

        let txs = send(&app, "GET", &txs_uri).await;
        assert_eq!(served_from(&txs), "upstream");
        assert_eq!(body_text(txs).await, r#"["tx1"]"#);

        let info = send(&app, "GET", &info_uri).await;
        assert_eq!(served_from(&info), "cache");
        assert_eq!(body_text(info).await, r#"{"height":1}"#);

        let stats = body_json(send(&app, "GET", "/api/cache/stats").await).await;
        assert_eq!(stats["key_count"], 2);
    }

    #[tokio::test]
    async fn test_upstream_status_preserved() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(2)
            .mount(&server)
            .await;
        let app = test_app(&server.uri()).await;

        for _ in 0..2 {
            let response = send(&app, "GET", "/api/address/addr1/txs").await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            let body = body_json(response).await;
            assert_eq!(body["error"]["code"], "UPSTREAM_HTTP_ERROR");
        }
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_503() {
        let app = test_app("http://127.0.0.1:1").await;
        let response = send(&app, "GET", "/api/address/addr1/txs").await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "UPSTREAM_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_block_pagination_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/block/{}/txs", HASH)))
            .and(query_param("start_index", "25"))
            .and(query_param("limit", "25"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"["tx26"]"#))
            .expect(2)
            .mount(&server)
            .await;
        let app = test_app(&server.uri()).await;

        let uri = format!("/api/block/{}/txs?start_index=25&limit=25", HASH);
        for _ in 0..2 {
            let response = send(&app, "GET", &uri).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(served_from(&response), "upstream");
            assert_eq!(body_text(response).await, r#"["tx26"]"#);
        }

        let stats = body_json(send(&app, "GET", "/api/cache/stats").await).await;
        assert_eq!(stats["key_count"], 0);
    }

    #[tokio::test]
    async fn test_cache_stats_and_clear() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&server)
            .await;
        let app = test_app(&server.uri()).await;

        send(&app, "GET", "/api/address/addr1/txs").await;
        send(&app, "GET", &format!("/api/block/{}/txs", HASH)).await;
        send(&app, "GET", "/api/address/addr1/txs").await;

        let stats = body_json(send(&app, "GET", "/api/cache/stats").await).await;
        assert_eq!(stats["enabled"], true);
        assert_eq!(stats["key_count"], 2);
        assert!(stats["hit_rate"].as_f64().unwrap() > 0.0);

        let response = send(&app, "POST", "/api/cache/clear").await;
        assert_eq!(response.status(), StatusCode::OK);
        let report = body_json(response).await;
        assert_eq!(report["removed_count"], 2);
        assert_eq!(report["cache_enabled"], true);

        let after = send(&app, "GET", "/api/address/addr1/txs").await;
        assert_eq!(served_from(&after), "upstream");
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let app = test_app(&server.uri()).await;

        let response = send(&app, "GET", "/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["upstream_reachable"], true);
        assert_eq!(body["cache_enabled"], true);
        assert_eq!(body["address_api_url"], format!("{}/address", server.uri()));
        assert_eq!(body["tx_api_url"], format!("{}/tx", server.uri()));
    }

    #[tokio::test]
    async fn test_health_with_upstream_down() {
        let app = test_app("http://127.0.0.1:1").await;
        let body = body_json(send(&app, "GET", "/health").await).await;

        assert_eq!(body["status"], "degraded");
        assert_eq!(body["upstream_reachable"], false);
    }
}
