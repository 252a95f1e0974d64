//! Route table and shared handler state.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use history_scanner::HistoryScanApi;

use crate::domain::{GatewayConfig, SubscriberRegistry};
use crate::handlers;
use crate::middleware::TracingLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub scanner: Arc<dyn HistoryScanApi>,
    pub subscribers: Arc<SubscriberRegistry>,
}

impl AppState {
    pub fn new(scanner: Arc<dyn HistoryScanApi>) -> Self {
        Self {
            scanner,
            subscribers: Arc::new(SubscriberRegistry::new()),
        }
    }
}

/// Build the HTTP router.
pub fn build_router(state: AppState, config: &GatewayConfig) -> Router {
    Router::new()
        .route("/current-block", get(handlers::current_block))
        .route("/subscribe", post(handlers::subscribe))
        .route("/transactions/:address", get(handlers::transactions))
        .route("/health", get(handlers::health))
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(TracingLayer::new())
        .with_state(state)
}
