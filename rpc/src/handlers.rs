//! RPC request handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use stakeway_rewards::RewardError;
use stakeway_types::ValidationError;

use crate::error::RpcError;
use crate::server::RpcState;

const STAKE_FAILED: &str = "Failed to process staking";
const REWARDS_FAILED: &str = "Failed to retrieve rewards";

// ── Health ───────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub alive: bool,
}

// ── Stake ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct StakeRequest {
    pub wallet_address: String,
    pub amount: f64,
}

#[derive(Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ── Rewards ──────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
pub struct RewardsResponse {
    pub wallet_address: String,
    pub rewards: f64,
}

/// Run a ledger call on the blocking pool; LMDB transactions must not
/// stall the async workers.
async fn blocking<T, F>(context: &'static str, f: F) -> Result<T, RpcError>
where
    F: FnOnce() -> Result<T, RewardError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| RpcError::Task {
            context,
            reason: e.to_string(),
        })?
        .map_err(|e| RpcError::from_reward(context, e))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { alive: true })
}

/// The body is decoded as JSON whatever `Content-Type` says.
pub async fn stake(
    State(state): State<RpcState>,
    body: Bytes,
) -> Result<(StatusCode, Json<MessageResponse>), RpcError> {
    let request: StakeRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "unparseable stake payload");
        RpcError::InvalidPayload
    })?;

    let service = Arc::clone(&state.service);
    let event = blocking(STAKE_FAILED, move || {
        service.stake(&request.wallet_address, request.amount)
    })
    .await?;

    tracing::info!(
        id = %event.id,
        wallet = %event.wallet_address,
        amount = %event.amount,
        "stake recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Staking successful".to_string(),
        }),
    ))
}

pub async fn rewards(
    State(state): State<RpcState>,
    Path(wallet_address): Path<String>,
) -> Result<Json<RewardsResponse>, RpcError> {
    if wallet_address.is_empty() {
        return Err(ValidationError::EmptyAddress.into());
    }

    let service = Arc::clone(&state.service);
    let wallet = wallet_address.clone();
    let rewards = blocking(REWARDS_FAILED, move || service.get_rewards(&wallet)).await?;

    Ok(Json(RewardsResponse {
        wallet_address,
        rewards: rewards.to_decimal(),
    }))
}

/// `GET /v1/rewards/` with nothing after the slash.
pub async fn rewards_without_wallet() -> RpcError {
    ValidationError::EmptyAddress.into()
}

pub async fn metrics(State(state): State<RpcState>) -> Result<impl IntoResponse, RpcError> {
    let metrics = state.metrics.as_ref().ok_or(RpcError::MetricsDisabled)?;
    let body = metrics
        .encode()
        .map_err(|e| RpcError::Metrics(e.to_string()))?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}
