//! # HTTP API Tests
//!
//! Exercises every route through the full router (middleware included)
//! against a scripted scanner.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use history_scanner::{
    AddressError, BlockNumber, HistoryScanApi, RpcError, ScanRequest, Transaction,
};
use parser_gateway::middleware::REQUEST_ID_HEADER;
use parser_gateway::{GatewayConfig, GatewayService};

const ALICE: &str = "0x00000000000000000000000000000000000000a1";

// =============================================================================
// Test doubles
// =============================================================================

struct ScriptedScanner {
    head: Result<BlockNumber, RpcError>,
    history: Vec<Transaction>,
}

impl ScriptedScanner {
    fn healthy() -> Self {
        Self {
            head: Ok(19_000_000),
            history: vec![Transaction {
                hash: "0xfeed".into(),
                from: ALICE.into(),
                to: Some("0xb2".into()),
                ..Default::default()
            }],
        }
    }

    fn offline() -> Self {
        Self {
            head: Err(RpcError::Transport("connection refused".into())),
            history: Vec::new(),
        }
    }
}

#[async_trait]
impl HistoryScanApi for ScriptedScanner {
    async fn current_block(&self) -> Result<BlockNumber, RpcError> {
        self.head.clone()
    }

    async fn validate_address(&self, address: &str) -> Result<(), AddressError> {
        match address {
            "0xdown" => Err(AddressError::Unreachable(RpcError::Status(503))),
            a if a.starts_with("0x") => Ok(()),
            a => Err(AddressError::NotHex {
                address: a.into(),
                reason: "Invalid character".into(),
            }),
        }
    }

    async fn scan(&self, _request: ScanRequest) -> Vec<Transaction> {
        self.history.clone()
    }

    async fn transactions_for(&self, address: &str) -> Vec<Transaction> {
        self.history
            .iter()
            .filter(|tx| tx.touches(address))
            .cloned()
            .collect()
    }
}

fn app(scanner: ScriptedScanner) -> Router {
    GatewayService::new(GatewayConfig::default(), Arc::new(scanner))
        .unwrap()
        .router()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// =============================================================================
// Routes
// =============================================================================

#[tokio::test]
async fn test_current_block() {
    let app = app(ScriptedScanner::healthy());
    let (status, body) = send(&app, get("/current-block")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"current_block": 19_000_000}));
}

#[tokio::test]
async fn test_current_block_node_failure_is_bad_gateway() {
    let app = app(ScriptedScanner::offline());
    let (status, body) = send(&app, get("/current-block")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_subscribe_then_duplicate() {
    let app = app(ScriptedScanner::healthy());

    let (status, body) = send(&app, post_json("/subscribe", &json!({"address": ALICE}).to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(true));

    let (status, body) = send(&app, post_json("/subscribe", &json!({"address": ALICE}).to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already subscribed"));
}

#[tokio::test]
async fn test_subscribe_rejects_bad_input() {
    let app = app(ScriptedScanner::healthy());

    let (status, body) = send(&app, post_json("/subscribe", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, post_json("/subscribe", r#"{"address": ""}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "address should not be empty"}));

    let (status, _) = send(&app, post_json("/subscribe", "{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_subscribers_shared_with_service() {
    let service = GatewayService::new(
        GatewayConfig::default(),
        Arc::new(ScriptedScanner::healthy()),
    )
    .unwrap();
    let registry = service.subscribers();
    let app = service.router();

    let (status, _) = send(&app, post_json("/subscribe", r#"{"address": "0xabc"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(registry.is_subscribed("0xabc"));
}

#[tokio::test]
async fn test_transactions_for_valid_address() {
    let app = app(ScriptedScanner::healthy());
    let (status, body) = send(&app, get(&format!("/transactions/{ALICE}"))).await;
    assert_eq!(status, StatusCode::OK);

    let txs = body.as_array().unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0]["hash"], "0xfeed");
    assert_eq!(txs[0]["from"], ALICE);
}

#[tokio::test]
async fn test_transactions_without_matches_is_empty_array() {
    let app = app(ScriptedScanner::healthy());
    let (status, body) = send(&app, get("/transactions/0x0123")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_transactions_invalid_address() {
    let app = app(ScriptedScanner::healthy());

    let (status, body) = send(&app, get("/transactions/zzz")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("not a hex string"));

    let (status, _) = send(&app, get("/transactions/0xdown")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_health_and_request_id() {
    let app = app(ScriptedScanner::offline());
    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));

    let (_, body) = send(&app, get("/health")).await;
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let config = GatewayConfig {
        max_body_bytes: 32,
        ..Default::default()
    };
    let app = GatewayService::new(config, Arc::new(ScriptedScanner::healthy()))
        .unwrap()
        .router();

    let body = json!({"address": "0x".to_string() + &"a".repeat(64)}).to_string();
    let (status, _) = send(&app, post_json("/subscribe", &body)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_serve_until_shutdown() {
    let config = GatewayConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        ..Default::default()
    };
    let service = GatewayService::new(config, Arc::new(ScriptedScanner::healthy())).unwrap();
    let listener = service.bind().await.unwrap();
    assert_ne!(listener.local_addr().unwrap().port(), 0);

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(service.serve(listener, async {
        let _ = rx.await;
    }));

    tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}
