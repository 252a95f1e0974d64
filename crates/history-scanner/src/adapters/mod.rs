//! # Adapters Layer
//!
//! Concrete implementations of the outbound ports.

pub mod rpc;

pub use rpc::JsonRpcClient;
