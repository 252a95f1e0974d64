//! # Domain Errors
//!
//! Failures surfaced by the RPC port and by address validation.
//!
//! Inside a scan these are recovered at the narrowest scope (per chunk or per
//! block) and only logged; they reach callers through the single-call
//! operations (`current_block`, `validate_address`).

use super::value_objects::HexQuantityError;

/// Errors from a JSON-RPC round trip.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RpcError {
    /// Connection refused, reset, DNS failure and similar.
    #[error("RPC transport error: {0}")]
    Transport(String),

    /// The call did not complete within the configured timeout.
    #[error("RPC call timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The node answered with a non-2xx HTTP status.
    #[error("RPC endpoint returned HTTP {0}")]
    Status(u16),

    /// The response body was not a valid JSON-RPC envelope or payload.
    #[error("failed to decode RPC response: {0}")]
    Decode(String),

    /// The node returned a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The envelope carried neither a result nor an error.
    #[error("RPC response for {0} carried no result")]
    MissingResult(&'static str),

    /// A hex quantity in the response could not be decoded.
    #[error("invalid quantity in RPC response: {0}")]
    Quantity(#[from] HexQuantityError),
}

impl RpcError {
    /// Whether the failure happened before a well-formed answer was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_) | Self::Status(_))
    }
}

/// Reasons an address is refused before a scan starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("address should not be empty")]
    Empty,

    #[error("address {address} is not a hex string: {reason}")]
    NotHex { address: String, reason: String },

    /// The node could not be reached to confirm the address.
    #[error("could not validate address: {0}")]
    Unreachable(RpcError),
}

/// Invalid scanner configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("batch_size must be at least 1")]
    ZeroBatchSize,

    #[error("batch_size {size} exceeds the maximum of {max}")]
    BatchSizeTooLarge { size: u64, max: u64 },

    #[error("requests_per_second must be at least 1")]
    ZeroRateLimit,

    #[error("workers must be at least 1")]
    ZeroWorkers,

    #[error("timeouts must be non-zero")]
    ZeroTimeout,

    #[error("invalid RPC endpoint {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}
