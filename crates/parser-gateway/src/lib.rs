//! # Parser Gateway
//!
//! HTTP API over the address history scanner.
//!
//! | Route | Result |
//! |-------|--------|
//! | `GET /current-block` | `{"current_block": n}`, `502` if the node fails |
//! | `POST /subscribe` | `true`, `400` on bad JSON, empty or duplicate address |
//! | `GET /transactions/:address` | matching transactions, `400` for an invalid address |
//! | `GET /health` | `{"status": "ok"}` |
//!
//! Errors are returned as `{"error": "<message>"}`.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;

// Re-exports for public API
pub use domain::{
    ApiError, ApiResult, GatewayConfig, GatewayError, SubscribeError, SubscriberRegistry,
};
pub use router::{build_router, AppState};
pub use service::GatewayService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
