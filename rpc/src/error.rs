//! RPC error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use stakeway_rewards::RewardError;
use stakeway_store::StoreError;
use stakeway_types::ValidationError;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid request payload")]
    InvalidPayload,

    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("{context}: blocking task failed: {reason}")]
    Task {
        context: &'static str,
        reason: String,
    },

    #[error("metrics are disabled")]
    MetricsDisabled,

    #[error("handler panicked: {0}")]
    Panic(String),

    #[error("failed to encode metrics: {0}")]
    Metrics(String),

    #[error("server error: {0}")]
    Server(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl RpcError {
    /// Attach the endpoint's public failure message to an engine error.
    pub fn from_reward(context: &'static str, err: RewardError) -> Self {
        match err {
            RewardError::Validation(e) => RpcError::Validation(e),
            RewardError::Storage(source) => RpcError::Store { context, source },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RpcError::InvalidPayload | RpcError::Validation(_) => StatusCode::BAD_REQUEST,
            RpcError::MetricsDisabled => StatusCode::NOT_FOUND,
            RpcError::Store { .. }
            | RpcError::Task { .. }
            | RpcError::Panic(_)
            | RpcError::Metrics(_)
            | RpcError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The reason shown to the caller. Server-side failures get a generic
    /// message; the detail only goes to the log.
    pub fn public_message(&self) -> String {
        match self {
            RpcError::InvalidPayload => "Invalid request payload".to_string(),
            RpcError::Validation(e) => match e {
                ValidationError::InvalidAddress(_) => "Invalid Ethereum address".to_string(),
                ValidationError::EmptyAddress => "Wallet address is required".to_string(),
                ValidationError::NegativeAmount => "Amount must be non-negative".to_string(),
                ValidationError::NonFiniteAmount => "Amount must be a finite number".to_string(),
                ValidationError::AmountTooLarge => "Amount is too large".to_string(),
            },
            RpcError::Store { context, .. } | RpcError::Task { context, .. } => {
                context.to_string()
            }
            RpcError::MetricsDisabled => "Not found".to_string(),
            RpcError::Panic(_) | RpcError::Metrics(_) | RpcError::Server(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, Json(ErrorBody { error: self.public_message() })).into_response()
    }
}
