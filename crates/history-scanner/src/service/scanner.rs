//! # History Scanner Service
//!
//! Implements [`HistoryScanApi`] on top of a [`ChainClient`], a shared
//! [`RateGate`] and the [`ScanPipeline`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, instrument};

use super::pipeline::{ScanOutcome, ScanPipeline};
use super::rate_gate::RateGate;
use crate::domain::{AddressError, BlockNumber, ConfigError, RpcError, ScanConfig, Transaction};
use crate::ports::{ChainClient, HistoryScanApi, ScanRequest, SystemTimeSource, TimeSource};

/// Address history scanner.
///
/// One instance owns one [`RateGate`]; every scan it runs draws permits
/// from that gate, so the rate ceiling holds across concurrent requests.
pub struct HistoryScanner {
    client: Arc<dyn ChainClient>,
    pipeline: ScanPipeline,
}

impl HistoryScanner {
    /// Create a scanner using the system clock.
    pub fn new(client: Arc<dyn ChainClient>, config: ScanConfig) -> Result<Self, ConfigError> {
        Self::with_clock(client, config, Arc::new(SystemTimeSource))
    }

    /// Create a scanner with an explicit time source.
    pub fn with_clock(
        client: Arc<dyn ChainClient>,
        config: ScanConfig,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let gate = Arc::new(RateGate::per_second(config.requests_per_second)?);
        let pipeline = ScanPipeline::new(Arc::clone(&client), gate, clock, config);
        Ok(Self { client, pipeline })
    }

    pub fn config(&self) -> &ScanConfig {
        self.pipeline.config()
    }

    /// Run a scan and return the matches together with its statistics.
    pub async fn scan_with_outcome(&self, request: ScanRequest) -> ScanOutcome {
        self.pipeline.run(request).await
    }
}

#[async_trait]
impl HistoryScanApi for HistoryScanner {
    async fn current_block(&self) -> Result<BlockNumber, RpcError> {
        self.client.current_block().await
    }

    #[instrument(skip(self))]
    async fn validate_address(&self, address: &str) -> Result<(), AddressError> {
        if address.is_empty() {
            return Err(AddressError::Empty);
        }

        let digits = address
            .strip_prefix("0x")
            .or_else(|| address.strip_prefix("0X"))
            .unwrap_or(address);
        hex::decode(digits).map_err(|e| AddressError::NotHex {
            address: address.to_string(),
            reason: e.to_string(),
        })?;

        // Any decoded answer counts, an error object included.
        match self.client.balance(address).await {
            Ok(balance) => {
                debug!(%balance, "Address accepted by node");
                Ok(())
            }
            Err(e @ (RpcError::Rpc { .. } | RpcError::MissingResult(_))) => {
                debug!(error = %e, "Balance probe answered without a balance; address accepted");
                Ok(())
            }
            Err(e) => Err(AddressError::Unreachable(e)),
        }
    }

    async fn scan(&self, request: ScanRequest) -> Vec<Transaction> {
        self.pipeline.run(request).await.transactions
    }

    async fn transactions_for(&self, address: &str) -> Vec<Transaction> {
        let head = match self.client.current_block().await {
            Ok(head) => head,
            Err(e) => {
                error!(%address, error = %e, "Error getting current block");
                return Vec::new();
            }
        };

        let request = ScanRequest::new(address, 0, head, self.config().day_limit);
        self.scan(request).await
    }
}
