//! JSON-RPC 2.0 envelopes.

use serde::{Deserialize, Serialize};

/// Method names used by the scanner.
pub mod methods {
    pub const BLOCK_NUMBER: &str = "eth_blockNumber";
    pub const GET_BALANCE: &str = "eth_getBalance";
    pub const GET_BLOCK_BY_NUMBER: &str = "eth_getBlockByNumber";
}

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest<T> {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: T,
    pub id: u64,
}

impl<T> JsonRpcRequest<T> {
    pub fn new(method: &'static str, params: T, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method,
            params,
            id,
        }
    }
}

/// JSON-RPC response structure.
///
/// `result` is kept as raw JSON so one bad item in a batch can be judged on
/// its own.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: serde_json::Value,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Numeric correlation id; numeric strings are accepted as well.
    pub fn id(&self) -> Option<u64> {
        match &self.id {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// The result payload if present and not `null`.
    pub fn into_result(self) -> Option<serde_json::Value> {
        self.result.filter(|value| !value.is_null())
    }
}

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RPC Error {}: {}", self.code, self.message)
    }
}

/// A batch reply: normally an array, but some nodes answer a rejected batch
/// with a single error envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BatchReply {
    Batch(Vec<JsonRpcResponse>),
    Single(JsonRpcResponse),
}
