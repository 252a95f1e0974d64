//! # Ethparser Node Runtime
//!
//! Wiring for the `ethparser` binary:
//!
//! ```text
//!   .env + environment ──► NodeConfig
//!                              │
//!        JsonRpcClient ──► HistoryScanner ──► GatewayService ──► HTTP
//! ```
//!
//! - `config` - environment loading and validation
//! - `runtime` - component construction and the serve loop

pub mod config;
pub mod runtime;

pub use config::NodeConfig;
pub use runtime::NodeRuntime;

/// Startup failures.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Scanner(#[from] history_scanner::ConfigError),

    #[error(transparent)]
    Gateway(#[from] parser_gateway::GatewayError),
}
