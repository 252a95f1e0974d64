//! Gateway service: binds the listener and serves the router until shutdown.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use history_scanner::HistoryScanApi;

use crate::domain::{GatewayConfig, GatewayError, SubscriberRegistry};
use crate::router::{build_router, AppState};

/// HTTP gateway in front of a [`HistoryScanApi`].
pub struct GatewayService {
    config: GatewayConfig,
    state: AppState,
}

impl GatewayService {
    /// Create a new gateway service
    pub fn new(config: GatewayConfig, scanner: Arc<dyn HistoryScanApi>) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        Ok(Self {
            config,
            state: AppState::new(scanner),
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Subscriber registry backing `POST /subscribe`.
    pub fn subscribers(&self) -> Arc<SubscriberRegistry> {
        Arc::clone(&self.state.subscribers)
    }

    /// Router with all routes and middleware attached.
    pub fn router(&self) -> Router {
        build_router(self.state.clone(), &self.config)
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> Result<TcpListener, GatewayError> {
        let addr = self.config.addr();
        TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))
    }

    /// Serve on `listener` until `shutdown` resolves, then drain in-flight requests.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local: Option<SocketAddr> = listener.local_addr().ok();
        info!(addr = ?local, "Starting HTTP server");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| GatewayError::Server(e.to_string()))?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }
}
