//! HTTP API for the Stakeway service.
//!
//! Provides endpoints for:
//! - Liveness (`GET /v1/health`)
//! - Stake submission (`POST /v1/stake`)
//! - Reward queries (`GET /v1/rewards/:wallet_address`)
//! - Prometheus metrics (`GET /metrics`, when enabled)

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod server;

pub use error::RpcError;
pub use metrics::HttpMetrics;
pub use server::{router, with_middleware, RpcServer, RpcState, REQUEST_ID_HEADER};
