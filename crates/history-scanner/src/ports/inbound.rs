//! # Inbound Ports (Driving Ports)
//!
//! The API the scanner exposes to the surrounding service.

use async_trait::async_trait;

use crate::domain::{AddressError, BlockNumber, RpcError, Transaction};

/// Parameters of one historical scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    /// Address to match against sender and recipient (exact string match).
    pub address: String,
    /// Oldest block to consider (inclusive).
    pub first_block: BlockNumber,
    /// Newest block to consider (inclusive); the scan walks down from here.
    pub last_block: BlockNumber,
    /// Age limit in days; `0` disables the cutoff.
    pub day_limit: u64,
}

impl ScanRequest {
    pub fn new(
        address: impl Into<String>,
        first_block: BlockNumber,
        last_block: BlockNumber,
        day_limit: u64,
    ) -> Self {
        Self {
            address: address.into(),
            first_block,
            last_block,
            day_limit,
        }
    }
}

/// Primary API of the history scanner.
#[async_trait]
pub trait HistoryScanApi: Send + Sync {
    /// Current chain head.
    async fn current_block(&self) -> Result<BlockNumber, RpcError>;

    /// Confirm `address` is well-formed and known to the node.
    async fn validate_address(&self, address: &str) -> Result<(), AddressError>;

    /// Scan `[first_block, last_block]` for transactions touching the address.
    ///
    /// Never fails: chunks that cannot be fetched contribute nothing.
    async fn scan(&self, request: ScanRequest) -> Vec<Transaction>;

    /// Scan from genesis up to the current head with the configured day limit.
    ///
    /// Returns an empty list if the head cannot be fetched.
    async fn transactions_for(&self, address: &str) -> Vec<Transaction>;
}
