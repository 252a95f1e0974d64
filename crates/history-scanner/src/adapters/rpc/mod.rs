//! JSON-RPC over HTTP adapter.

pub mod client;
pub mod types;

pub use client::{correlate_blocks, JsonRpcClient};
pub use types::{methods, BatchReply, JsonRpcError, JsonRpcRequest, JsonRpcResponse};
