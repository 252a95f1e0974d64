//! JSON-RPC client over HTTP for the [`ChainClient`] port.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace, warn};
use url::Url;

use super::types::{methods, BatchReply, JsonRpcRequest, JsonRpcResponse};
use crate::domain::{
    parse_hex_quantity, to_hex_quantity, Block, BlockNumber, Chunk, ConfigError, RpcConfig,
    RpcError,
};
use crate::ports::ChainClient;

/// HTTP JSON-RPC client.
///
/// Request ids come from a per-client atomic counter, so every id inside a
/// batch is distinct and batch responses are matched back by id, never by
/// position.
#[derive(Debug)]
pub struct JsonRpcClient {
    http: Client,
    endpoint: Url,
    request_timeout: Duration,
    request_id: AtomicU64,
}

impl JsonRpcClient {
    /// Create a client for the configured endpoint.
    pub fn new(config: &RpcConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let endpoint = config.endpoint()?;

        let http = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            request_timeout: config.request_timeout,
            request_id: AtomicU64::new(1),
        })
    }

    /// Endpoint this client talks to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Get the next request ID.
    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// POST a JSON body and return the raw response bytes of a 2xx reply.
    async fn post<B: Serialize + ?Sized>(&self, body: &B) -> Result<Vec<u8>, RpcError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Status(status.as_u16()));
        }

        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|e| self.transport_error(e))
    }

    fn transport_error(&self, e: reqwest::Error) -> RpcError {
        if e.is_timeout() {
            RpcError::Timeout(self.request_timeout)
        } else {
            RpcError::Transport(e.to_string())
        }
    }

    /// Call a single JSON-RPC method.
    async fn call<P, R>(&self, method: &'static str, params: P) -> Result<R, RpcError>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let request = JsonRpcRequest::new(method, params, self.next_id());
        let body = self.post(&request).await?;

        let response: JsonRpcResponse =
            serde_json::from_slice(&body).map_err(|e| RpcError::Decode(e.to_string()))?;

        if let Some(error) = response.error {
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        let result = response
            .into_result()
            .ok_or(RpcError::MissingResult(method))?;
        serde_json::from_value(result).map_err(|e| RpcError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ChainClient for JsonRpcClient {
    async fn current_block(&self) -> Result<BlockNumber, RpcError> {
        let head: String = self.call(methods::BLOCK_NUMBER, [(); 0]).await?;
        Ok(parse_hex_quantity(&head)?)
    }

    async fn fetch_blocks(
        &self,
        chunk: Chunk,
        full_transactions: bool,
    ) -> Result<Vec<Block>, RpcError> {
        let mut requests = Vec::with_capacity(chunk.len() as usize);
        let mut slots = HashMap::with_capacity(chunk.len() as usize);
        for (position, number) in chunk.into_iter().enumerate() {
            let id = self.next_id();
            slots.insert(id, (position, number));
            requests.push(JsonRpcRequest::new(
                methods::GET_BLOCK_BY_NUMBER,
                (to_hex_quantity(number), full_transactions),
                id,
            ));
        }

        trace!(chunk = %chunk, requests = requests.len(), "Sending block batch");
        let body = self.post(&requests).await?;
        let reply: BatchReply =
            serde_json::from_slice(&body).map_err(|e| RpcError::Decode(e.to_string()))?;

        correlate_blocks(chunk, &slots, reply)
    }

    async fn balance(&self, address: &str) -> Result<String, RpcError> {
        self.call(methods::GET_BALANCE, (address, "latest")).await
    }
}

/// Map a batch reply back onto the requested block numbers using the
/// correlation ids in `slots` (`id -> (request position, block number)`).
///
/// Blocks come back in request order (ascending block number) whatever order
/// the node answered in. Items with an error object or a null result are
/// dropped; a non-null result that is not a block fails the whole chunk.
pub fn correlate_blocks(
    chunk: Chunk,
    slots: &HashMap<u64, (usize, BlockNumber)>,
    reply: BatchReply,
) -> Result<Vec<Block>, RpcError> {
    let responses = match reply {
        BatchReply::Batch(responses) => responses,
        BatchReply::Single(response) => {
            return Err(match response.error {
                Some(error) => RpcError::Rpc {
                    code: error.code,
                    message: error.message,
                },
                None => RpcError::Decode("expected a batch response array".to_string()),
            });
        }
    };

    let mut ordered: Vec<Option<Block>> = vec![None; slots.len()];
    for response in responses {
        let Some((position, number)) = response.id().and_then(|id| slots.get(&id)).copied()
        else {
            warn!(chunk = %chunk, id = %response.id, "Dropping response with unknown correlation id");
            continue;
        };

        if let Some(error) = response.error.as_ref() {
            debug!(block = number, error = %error, "Block not served by node");
            continue;
        }

        let Some(result) = response.into_result() else {
            debug!(block = number, "Node returned no block");
            continue;
        };

        let block: Block = serde_json::from_value(result).map_err(|e| {
            RpcError::Decode(format!("block {number}: {e}"))
        })?;
        ordered[position] = Some(block);
    }

    Ok(ordered.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn slots_for(chunk: Chunk, first_id: u64) -> HashMap<u64, (usize, BlockNumber)> {
        chunk
            .into_iter()
            .enumerate()
            .map(|(i, n)| (first_id + i as u64, (i, n)))
            .collect()
    }

    fn block_json(number: u64) -> serde_json::Value {
        json!({
            "number": format!("0x{number:x}"),
            "timestamp": "0x10",
            "transactions": []
        })
    }

    fn reply(value: serde_json::Value) -> BatchReply {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_correlates_by_id_not_position() {
        let chunk = Chunk::new(10, 12);
        let slots = slots_for(chunk, 100);
        let reply = reply(json!([
            {"jsonrpc": "2.0", "id": 102, "result": block_json(12)},
            {"jsonrpc": "2.0", "id": 100, "result": block_json(10)},
            {"jsonrpc": "2.0", "id": 101, "result": block_json(11)},
        ]));

        let blocks = correlate_blocks(chunk, &slots, reply).unwrap();
        let numbers: Vec<_> = blocks.iter().map(|b| b.number().unwrap()).collect();
        assert_eq!(numbers, vec![10, 11, 12]);
    }

    #[test]
    fn test_skips_null_and_error_items() {
        let chunk = Chunk::new(1, 3);
        let slots = slots_for(chunk, 1);
        let reply = reply(json!([
            {"jsonrpc": "2.0", "id": 1, "result": block_json(1)},
            {"jsonrpc": "2.0", "id": 2, "result": null},
            {"jsonrpc": "2.0", "id": 3, "error": {"code": -32000, "message": "header not found"}},
        ]));

        let blocks = correlate_blocks(chunk, &slots, reply).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].number(), Ok(1));
    }

    #[test]
    fn test_unknown_ids_are_dropped() {
        let chunk = Chunk::new(1, 1);
        let slots = slots_for(chunk, 1);
        let reply = reply(json!([
            {"jsonrpc": "2.0", "id": 999, "result": block_json(5)},
            {"jsonrpc": "2.0", "id": 1, "result": block_json(1)},
        ]));

        let blocks = correlate_blocks(chunk, &slots, reply).unwrap();
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn test_malformed_block_fails_chunk() {
        let chunk = Chunk::new(1, 2);
        let slots = slots_for(chunk, 1);
        let reply = reply(json!([
            {"jsonrpc": "2.0", "id": 1, "result": block_json(1)},
            {"jsonrpc": "2.0", "id": 2, "result": {"unexpected": true}},
        ]));

        let err = correlate_blocks(chunk, &slots, reply).unwrap_err();
        assert!(matches!(err, RpcError::Decode(_)));
    }

    #[test]
    fn test_single_error_envelope_fails_chunk() {
        let chunk = Chunk::new(1, 2);
        let slots = slots_for(chunk, 1);
        let reply = reply(json!({
            "jsonrpc": "2.0",
            "id": null,
            "error": {"code": -32005, "message": "batch limit exceeded"}
        }));

        let err = correlate_blocks(chunk, &slots, reply).unwrap_err();
        assert_eq!(
            err,
            RpcError::Rpc {
                code: -32005,
                message: "batch limit exceeded".into()
            }
        );
    }

    #[test]
    fn test_client_rejects_bad_endpoint() {
        let config = RpcConfig {
            url: "ftp://example.com".into(),
            ..Default::default()
        };
        assert!(matches!(
            JsonRpcClient::new(&config),
            Err(ConfigError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_request_ids_are_distinct() {
        let client = JsonRpcClient::new(&RpcConfig::default()).unwrap();
        let a = client.next_id();
        let b = client.next_id();
        assert_ne!(a, b);
    }
}
