//! Runtime configuration from the process environment.
//!
//! | Variable | Setting | Default |
//! |----------|---------|---------|
//! | `RPC_URL` | node endpoint | `https://ethereum-rpc.publicnode.com` |
//! | `RPC_TIMEOUT_SECS` | per-call timeout | `30` |
//! | `CHUNK_TIMEOUT_SECS` | ceiling on one batch fetch | `60`, or the per-call timeout if longer |
//! | `HOST` | bind address | `0.0.0.0` |
//! | `PORT` | HTTP port | `8080` |
//! | `TRANSACTION_DAYS_LIMIT` | age cutoff in days, `0` disables | `0` |
//! | `BATCH_SIZE` | blocks per batch call | `1000` |
//! | `RATE_LIMIT` | batch calls per second | `10` |
//! | `SCAN_WORKERS` | concurrent batch calls | `8` |
//! | `SCAN_ORDER` | `arrival` or `descending` | `arrival` |
//!
//! Unset or empty variables keep the default. Values that fail to parse are
//! logged and ignored.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use history_scanner::{RpcConfig, ScanConfig};
use parser_gateway::GatewayConfig;
use tracing::warn;

use crate::RuntimeError;

/// Complete runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    pub rpc: RpcConfig,
    pub scan: ScanConfig,
    pub gateway: GatewayConfig,
}

impl NodeConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("RPC_URL").filter(|url| !url.trim().is_empty()) {
            config.rpc.url = url.trim().to_string();
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "RPC_TIMEOUT_SECS") {
            config.rpc.request_timeout = Duration::from_secs(secs);
        }
        config.scan.chunk_timeout = match parse_var::<u64, _>(&lookup, "CHUNK_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(secs),
            None => config.scan.chunk_timeout.max(config.rpc.request_timeout),
        };

        if let Some(host) = parse_var(&lookup, "HOST") {
            config.gateway.host = host;
        }
        if let Some(port) = parse_var(&lookup, "PORT") {
            config.gateway.port = port;
        }

        if let Some(days) = parse_var(&lookup, "TRANSACTION_DAYS_LIMIT") {
            config.scan.day_limit = days;
        }
        if let Some(size) = parse_var(&lookup, "BATCH_SIZE") {
            config.scan.batch_size = size;
        }
        if let Some(rate) = parse_var(&lookup, "RATE_LIMIT") {
            config.scan.requests_per_second = rate;
        }
        if let Some(workers) = parse_var(&lookup, "SCAN_WORKERS") {
            config.scan.workers = workers;
        }
        if let Some(order) = parse_var(&lookup, "SCAN_ORDER") {
            config.scan.consume_order = order;
        }

        config
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        self.rpc.validate()?;
        self.scan.validate()?;
        self.gateway
            .validate()
            .map_err(|e| RuntimeError::Config(e.to_string()))?;
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(key, value, error = %e, "Ignoring invalid environment value");
            None
        }
    }
}
