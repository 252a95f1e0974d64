//! # History Scanner
//!
//! Reconstructs the transaction history of one address by walking a chain
//! backward from its head in fixed-size batches over JSON-RPC.
//!
//! ```text
//!   HistoryScanApi (inbound)
//!          │
//!   ┌──────┴───────────────────────────────────────────────┐
//!   │ HistoryScanner                                       │
//!   │   partition → RateGate → worker pool → bounded queue │
//!   │                                   → single consumer  │
//!   └──────┬───────────────────────────────────────────────┘
//!          │
//!   ChainClient (outbound) ── JsonRpcClient ── HTTP ── node
//! ```
//!
//! ## Guarantees
//!
//! - Chunks cover `[first, last]` exactly once, newest first.
//! - Chunk fetches start no faster than the configured rate, across every
//!   scan sharing a scanner.
//! - Batch responses are matched to requests by JSON-RPC id.
//! - A failed chunk costs only its own blocks; a scan never fails.
//! - Once the consumer stops, no producer stays blocked on the channel.
//!
//! ## Hexagonal Architecture
//!
//! - **Domain Layer** (`domain/`): partitioning, filtering, age cutoff, config
//! - **Ports Layer** (`ports/`): `HistoryScanApi` inbound, `ChainClient` and
//!   `TimeSource` outbound
//! - **Adapters Layer** (`adapters/`): JSON-RPC over HTTP
//! - **Service Layer** (`service/`): rate gate, pipeline, scanner
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use history_scanner::{HistoryScanApi, HistoryScanner, JsonRpcClient, RpcConfig, ScanConfig};
//!
//! let client = Arc::new(JsonRpcClient::new(&RpcConfig::default())?);
//! let scanner = HistoryScanner::new(client, ScanConfig::default())?;
//! let history = scanner.transactions_for("0xabc...").await;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export main types for convenience
pub use adapters::JsonRpcClient;
pub use domain::{
    matching_transactions, parse_hex_quantity, partition, to_hex_quantity, AddressError,
    AgeCutoff, Block, BlockNumber, BlockTransactions, Chunk, ConfigError, ConsumeOrder,
    HexQuantityError, RpcConfig, RpcError, ScanConfig, ScanId, Transaction, DEFAULT_RPC_URL,
    MAX_BATCH_SIZE,
};
pub use ports::{
    ChainClient, FixedTimeSource, HistoryScanApi, ScanRequest, SystemTimeSource, TimeSource,
};
pub use service::{HistoryScanner, RateGate, ScanOutcome, ScanPipeline, ScanStats};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
