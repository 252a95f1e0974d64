//! # Outbound Ports (Driven Ports)
//!
//! Interfaces the scanner needs from the outside world: the remote chain node
//! and a clock.

use async_trait::async_trait;

use crate::domain::{Block, BlockNumber, Chunk, RpcError};

/// Access to a remote chain node.
///
/// The production implementation speaks JSON-RPC over HTTP
/// ([`crate::adapters::JsonRpcClient`]); tests substitute in-memory doubles.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Height of the current chain head (`eth_blockNumber`).
    async fn current_block(&self) -> Result<BlockNumber, RpcError>;

    /// Fetch every block of `chunk` in one batch call.
    ///
    /// The whole chunk fails on transport or decode failure. Individual
    /// blocks the node has no data for are simply absent from the result.
    async fn fetch_blocks(
        &self,
        chunk: Chunk,
        full_transactions: bool,
    ) -> Result<Vec<Block>, RpcError>;

    /// Latest balance of `address` as a hex quantity (`eth_getBalance`).
    async fn balance(&self, address: &str) -> Result<String, RpcError>;
}

/// Time source for testability.
pub trait TimeSource: Send + Sync {
    /// Seconds since the Unix epoch.
    fn now(&self) -> u64;
}

/// System time implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Fixed clock for deterministic age-cutoff tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource(pub u64);

impl TimeSource for FixedTimeSource {
    fn now(&self) -> u64 {
        self.0
    }
}
