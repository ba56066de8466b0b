#![allow(missing_docs)]
//! End-to-end test: a tiny upstream, the gateway proxying to it, and a
//! plain `reqwest` client exercising both the proxy path and the
//! documentation endpoints.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Json;
use axum::routing::get;
use docurift_core::AnalyzerConfig;
use serde_json::{Value, json};
use url::Url;

async fn spawn_upstream() -> SocketAddr {
    let router = axum::Router::new().route(
        "/echo",
        get(|| async { Json(json!({"id": 1, "name": "Ada"})) }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn spawn_gateway(upstream: Url, storage_dir: &std::path::Path) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let config = AnalyzerConfig {
        max_examples: 10,
        redacted_fields: Vec::new(),
        storage_path: storage_dir.to_path_buf(),
        storage_frequency: Duration::from_secs(3600),
    };
    tokio::spawn(async move {
        docurift_gateway::launch(listener, upstream, config).await.unwrap();
    });
    addr
}

async fn wait_until_ready(addr: SocketAddr) {
    for _ in 0..50 {
        if reqwest::get(format!("http://{addr}/api/analyzer")).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("gateway never became reachable at {addr}");
}

#[tokio::test]
async fn proxies_requests_and_records_them_in_the_analyzer() {
    let upstream_addr = spawn_upstream().await;
    let upstream_url = Url::parse(&format!("http://{upstream_addr}")).unwrap();

    let storage_dir = std::env::temp_dir().join(format!("docurift-gateway-test-{}", std::process::id()));
    let gateway_addr = spawn_gateway(upstream_url, &storage_dir).await;
    wait_until_ready(gateway_addr).await;

    let response = reqwest::get(format!("http://{gateway_addr}/echo")).await.unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "Ada");

    let analyzer: Value = reqwest::get(format!("http://{gateway_addr}/api/analyzer"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(analyzer.get("GET /echo").is_some());

    let openapi: Value = reqwest::get(format!("http://{gateway_addr}/api/openapi.json"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(openapi["openapi"], "3.0.0");
    assert!(openapi["paths"].get("/echo").is_some());

    let postman = reqwest::get(format!("http://{gateway_addr}/api/postman.json"))
        .await
        .unwrap();
    assert_eq!(postman.status(), 501);

    tokio::fs::remove_dir_all(&storage_dir).await.ok();
}
