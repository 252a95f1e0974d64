//! HTTP handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use history_scanner::{BlockNumber, Transaction};

use crate::domain::{ApiError, ApiResult};
use crate::router::AppState;

/// Body of `GET /current-block`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentBlockResponse {
    pub current_block: BlockNumber,
}

/// Body of `POST /subscribe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub address: String,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// `GET /current-block`
pub async fn current_block(State(state): State<AppState>) -> ApiResult<Json<CurrentBlockResponse>> {
    let current_block = state.scanner.current_block().await?;
    Ok(Json(CurrentBlockResponse { current_block }))
}

/// `POST /subscribe`
pub async fn subscribe(
    State(state): State<AppState>,
    body: Result<Json<SubscribeRequest>, JsonRejection>,
) -> ApiResult<Json<bool>> {
    let Json(request) = body.map_err(reject_body)?;

    let since = state.subscribers.subscribe(&request.address)?;
    info!(
        address = %request.address,
        %since,
        subscribers = state.subscribers.len(),
        "Address subscribed"
    );
    Ok(Json(true))
}

/// Any unreadable body is a 400, except an oversized one which keeps its 413.
fn reject_body(rejection: JsonRejection) -> ApiError {
    let message = format!("invalid request body: {}", rejection.body_text());
    match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, message),
        _ => ApiError::bad_request(message),
    }
}

/// `GET /transactions/:address`
pub async fn transactions(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<Json<Vec<Transaction>>> {
    state.scanner.validate_address(&address).await?;

    let history = state.scanner.transactions_for(&address).await;
    debug!(%address, matches = history.len(), "Transactions collected");
    Ok(Json(history))
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
    })
}
