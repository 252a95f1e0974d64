//! Domain layer for the HTTP gateway.

pub mod config;
pub mod error;
pub mod subscribers;

pub use config::{ConfigError, GatewayConfig, DEFAULT_PORT};
pub use error::{ApiError, ApiResult, GatewayError};
pub use subscribers::{SubscribeError, SubscriberRegistry};
