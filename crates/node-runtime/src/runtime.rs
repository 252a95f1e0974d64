//! Node runtime: owns the wired components and serves until shutdown.

use std::future::Future;
use std::sync::Arc;

use history_scanner::{HistoryScanApi, HistoryScanner, JsonRpcClient};
use parser_gateway::GatewayService;
use tracing::info;

use crate::config::NodeConfig;
use crate::RuntimeError;

/// The running service: JSON-RPC client → history scanner → HTTP gateway.
pub struct NodeRuntime {
    scanner: Arc<HistoryScanner>,
    gateway: GatewayService,
}

impl NodeRuntime {
    /// Validate `config` and wire every component.
    pub fn new(config: NodeConfig) -> Result<Self, RuntimeError> {
        config.validate()?;

        let client = JsonRpcClient::new(&config.rpc)?;
        info!(endpoint = %client.endpoint(), "JSON-RPC client ready");

        let scanner = Arc::new(HistoryScanner::new(Arc::new(client), config.scan.clone())?);
        info!(
            batch_size = config.scan.batch_size,
            rate = config.scan.requests_per_second,
            workers = config.scan.workers,
            day_limit = config.scan.day_limit,
            order = %config.scan.consume_order,
            "History scanner ready"
        );

        let api: Arc<dyn HistoryScanApi> = Arc::clone(&scanner) as Arc<dyn HistoryScanApi>;
        let gateway = GatewayService::new(config.gateway, api)?;

        Ok(Self { scanner, gateway })
    }

    /// Shared scanner instance.
    pub fn scanner(&self) -> Arc<HistoryScanner> {
        Arc::clone(&self.scanner)
    }

    /// Serve HTTP until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = self.gateway.bind().await?;
        if let Ok(addr) = listener.local_addr() {
            info!(%addr, "Listening");
        }
        self.gateway.serve(listener, shutdown).await?;
        Ok(())
    }
}
