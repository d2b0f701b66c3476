//! Axum-based RPC server.

use std::any::Any;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use stakeway_rewards::StakeService;

use crate::error::RpcError;
use crate::handlers;
use crate::metrics::{track_metrics, HttpMetrics};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct RpcState {
    pub service: Arc<dyn StakeService>,
    /// `None` disables both the `/metrics` route and request tracking.
    pub metrics: Option<Arc<HttpMetrics>>,
}

impl RpcState {
    pub fn new(service: Arc<dyn StakeService>, metrics: Option<Arc<HttpMetrics>>) -> Self {
        Self { service, metrics }
    }
}

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the full route table with the standard middleware stack.
pub fn router(state: RpcState, request_timeout: Duration) -> Router {
    let mut app = Router::new()
        .route("/v1/health", get(handlers::health))
        .route("/v1/stake", post(handlers::stake))
        .route("/v1/rewards/", get(handlers::rewards_without_wallet))
        .route("/v1/rewards/:wallet_address", get(handlers::rewards));

    if state.metrics.is_some() {
        app = app.route("/metrics", get(handlers::metrics));
    }

    with_middleware(app, state, request_timeout)
}

/// Wrap `app` in the middleware every route gets, outermost first:
///
/// 1. request id: reuse the caller's `x-request-id` or mint a UUID
/// 2. tracing span carrying that id
/// 3. echo the id on the response
/// 4. metrics, when enabled (unrouted requests count as `path="unmatched"`)
/// 5. panic recovery into a 500
/// 6. per-request timeout (408), routed requests only
pub fn with_middleware(
    app: Router<RpcState>,
    state: RpcState,
    request_timeout: Duration,
) -> Router {
    let mut app = app
        .route_layer(TimeoutLayer::new(request_timeout))
        .layer(CatchPanicLayer::custom(panic_response));

    if let Some(metrics) = state.metrics.clone() {
        app = app.layer(middleware::from_fn_with_state(metrics, track_metrics));
    }

    app.layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

fn request_span(req: &Request) -> tracing::Span {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    tracing::info_span!(
        "request",
        method = %req.method(),
        uri = %req.uri(),
        request_id
    )
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "non-string panic payload".to_string()
    };
    RpcError::Panic(detail).into_response()
}

/// A bound listener plus the router it will serve.
pub struct RpcServer {
    listener: TcpListener,
    app: Router,
}

impl RpcServer {
    /// Bind `addr`. Port 0 picks an ephemeral port; see [`RpcServer::local_addr`].
    pub async fn bind(
        addr: SocketAddr,
        state: RpcState,
        request_timeout: Duration,
    ) -> Result<Self, RpcError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| RpcError::Server(format!("failed to bind {addr}: {e}")))?;
        Ok(Self {
            listener,
            app: router(state, request_timeout),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, RpcError> {
        self.listener
            .local_addr()
            .map_err(|e| RpcError::Server(e.to_string()))
    }

    /// Serve until `shutdown` resolves, then stop accepting and let
    /// in-flight requests finish.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Ok(addr) = self.listener.local_addr() {
            tracing::info!(%addr, "RPC server listening");
        }
        axum::serve(self.listener, self.app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))
    }
}
