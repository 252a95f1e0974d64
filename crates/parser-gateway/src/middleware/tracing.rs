//! Request tracing middleware.
//!
//! Opens one span per request tagged with a UUID v7 request id, logs the
//! outcome with its latency and echoes the id back in `x-request-id`.

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    response::Response,
};
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tracing::{info, info_span, warn, Instrument, Span};
use uuid::Uuid;

/// Response header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Tracing layer that creates spans for each request
#[derive(Clone, Default)]
pub struct TracingLayer;

impl TracingLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for TracingLayer {
    type Service = TracingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TracingService { inner }
    }
}

/// Tracing service
#[derive(Clone)]
pub struct TracingService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for TracingService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();

        let request_id = Uuid::now_v7();
        let span = info_span!(
            "http_request",
            %request_id,
            http.method = %req.method(),
            http.target = %req.uri().path(),
            http.status = tracing::field::Empty,
        );

        Box::pin(
            async move {
                let started = Instant::now();
                let mut result = inner.call(req).await;

                if let Ok(response) = result.as_mut() {
                    let status = response.status();
                    Span::current().record("http.status", status.as_u16());
                    let elapsed_ms = started.elapsed().as_millis() as u64;
                    if status.is_server_error() {
                        warn!(elapsed_ms, "Request failed");
                    } else {
                        info!(elapsed_ms, "Request completed");
                    }
                    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                        response.headers_mut().insert(REQUEST_ID_HEADER, value);
                    }
                }

                result
            }
            .instrument(span),
        )
    }
}
