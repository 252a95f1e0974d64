//! Scanner configuration with validation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use super::errors::ConfigError;

/// Default public Ethereum JSON-RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "https://ethereum-rpc.publicnode.com";

/// Largest accepted batch size. One chunk is one JSON-RPC batch request.
pub const MAX_BATCH_SIZE: u64 = 10_000;

/// Order in which the consumer processes fetched blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumeOrder {
    /// Blocks are consumed as they arrive from concurrent fetches. The age
    /// cutoff is best-effort: it may fire before every newer block was seen.
    #[default]
    Arrival,
    /// Blocks are released chunk by chunk from the head downward, each chunk
    /// sorted by descending block number. The age cutoff stops exactly at the
    /// first too-old block walking back from the head.
    Descending,
}

impl fmt::Display for ConsumeOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arrival => f.write_str("arrival"),
            Self::Descending => f.write_str("descending"),
        }
    }
}

impl FromStr for ConsumeOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arrival" => Ok(Self::Arrival),
            "descending" | "ordered" => Ok(Self::Descending),
            other => Err(format!("unknown consume order {other:?}")),
        }
    }
}

/// JSON-RPC endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Node URL.
    pub url: String,
    /// Per-call timeout (connect + response).
    pub request_timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_RPC_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl RpcConfig {
    /// Parse and check the endpoint URL.
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.url).map_err(|e| ConfigError::InvalidEndpoint {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ConfigError::InvalidEndpoint {
                url: self.url.clone(),
                reason: format!("unsupported scheme {scheme:?}"),
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        self.endpoint().map(|_| ())
    }
}

/// Historical scan configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Max block numbers per chunk (and per batch call). Also the channel capacity.
    pub batch_size: u64,
    /// Global ceiling on chunk fetches per second.
    pub requests_per_second: u32,
    /// Age limit in days; `0` disables the cutoff.
    pub day_limit: u64,
    /// Max concurrent chunk fetches.
    pub workers: usize,
    /// Consumption policy for fetched blocks.
    pub consume_order: ConsumeOrder,
    /// Request full transaction objects (required for address filtering).
    pub full_transactions: bool,
    /// Upper bound on one chunk fetch, whatever the client's own timeout.
    pub chunk_timeout: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            requests_per_second: 10,
            day_limit: 0,
            workers: 8,
            consume_order: ConsumeOrder::Arrival,
            full_transactions: true,
            chunk_timeout: Duration::from_secs(60),
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::BatchSizeTooLarge {
                size: self.batch_size,
                max: MAX_BATCH_SIZE,
            });
        }
        if self.requests_per_second == 0 {
            return Err(ConfigError::ZeroRateLimit);
        }
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.chunk_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Capacity of the block channel between fetchers and the consumer.
    pub fn channel_capacity(&self) -> usize {
        let capacity = self.batch_size.clamp(1, MAX_BATCH_SIZE);
        usize::try_from(capacity).unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let scan = ScanConfig::default();
        assert_eq!(scan.batch_size, 1000);
        assert_eq!(scan.requests_per_second, 10);
        assert_eq!(scan.day_limit, 0);
        assert!(scan.validate().is_ok());
        assert!(RpcConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_values_rejected() {
        let mut scan = ScanConfig::default();
        scan.batch_size = 0;
        assert_eq!(scan.validate(), Err(ConfigError::ZeroBatchSize));

        let mut scan = ScanConfig::default();
        scan.requests_per_second = 0;
        assert_eq!(scan.validate(), Err(ConfigError::ZeroRateLimit));

        let mut scan = ScanConfig::default();
        scan.workers = 0;
        assert_eq!(scan.validate(), Err(ConfigError::ZeroWorkers));

        let mut scan = ScanConfig::default();
        scan.chunk_timeout = Duration::ZERO;
        assert_eq!(scan.validate(), Err(ConfigError::ZeroTimeout));

        let rpc = RpcConfig {
            request_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(rpc.validate(), Err(ConfigError::ZeroTimeout));
    }

    #[test]
    fn test_oversized_batch_rejected() {
        let mut scan = ScanConfig::default();
        scan.batch_size = MAX_BATCH_SIZE;
        assert!(scan.validate().is_ok());
        assert_eq!(scan.channel_capacity(), 10_000);

        scan.batch_size = u64::MAX;
        assert_eq!(
            scan.validate(),
            Err(ConfigError::BatchSizeTooLarge {
                size: u64::MAX,
                max: MAX_BATCH_SIZE
            })
        );
        assert_eq!(scan.channel_capacity(), 10_000);
    }

    #[test]
    fn test_endpoint_validation() {
        let rpc = RpcConfig {
            url: "not a url".into(),
            ..Default::default()
        };
        assert!(matches!(
            rpc.validate(),
            Err(ConfigError::InvalidEndpoint { .. })
        ));

        let rpc = RpcConfig {
            url: "ws://localhost:8546".into(),
            ..Default::default()
        };
        assert!(matches!(
            rpc.validate(),
            Err(ConfigError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_consume_order_parsing() {
        assert_eq!("arrival".parse::<ConsumeOrder>(), Ok(ConsumeOrder::Arrival));
        assert_eq!(" Descending ".parse::<ConsumeOrder>(), Ok(ConsumeOrder::Descending));
        assert!("sideways".parse::<ConsumeOrder>().is_err());
        assert_eq!(ConsumeOrder::Descending.to_string(), "descending");
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let scan: ScanConfig =
            serde_json::from_str(r#"{"day_limit": 3, "consume_order": "descending"}"#).unwrap();
        assert_eq!(scan.day_limit, 3);
        assert_eq!(scan.consume_order, ConsumeOrder::Descending);
        assert_eq!(scan.batch_size, 1000);
    }
}
