//! Prometheus metrics for the HTTP API.
//!
//! [`HttpMetrics`] owns a dedicated [`Registry`] rather than using the
//! process-global one, so several servers (or tests) can run side by side.
//! The `/metrics` endpoint encodes that registry into the Prometheus text
//! exposition format.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use prometheus::{
    register_histogram_vec_with_registry, register_int_counter_vec_with_registry, HistogramOpts,
    HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

const LABELS: &[&str] = &["path", "method", "status"];

/// `path` label for requests that hit no route.
pub const UNMATCHED_PATH: &str = "unmatched";

/// Request counters and latency histograms, labelled by route template,
/// method and status text.
pub struct HttpMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,
    /// Total number of HTTP requests handled.
    pub requests_total: IntCounterVec,
    /// Request latency in seconds, default Prometheus buckets.
    pub request_duration_seconds: HistogramVec,
}

impl HttpMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = register_int_counter_vec_with_registry!(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            LABELS,
            registry
        )?;

        let request_duration_seconds = register_histogram_vec_with_registry!(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "Histogram of response latency (seconds) of HTTP requests"
            ),
            LABELS,
            registry
        )?;

        Ok(Self {
            registry,
            requests_total,
            request_duration_seconds,
        })
    }

    /// Record one finished request.
    pub fn observe(&self, path: &str, method: &str, status: &str, elapsed: Duration) {
        let labels = [path, method, status];
        self.requests_total.with_label_values(&labels).inc();
        self.request_duration_seconds
            .with_label_values(&labels)
            .observe(elapsed.as_secs_f64());
    }

    /// Render every registered metric in the text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}

/// Middleware recording count and latency for each routed request.
///
/// The `path` label is the route template (`/v1/rewards/:wallet_address`),
/// never the raw URI, so per-wallet paths don't explode label cardinality.
/// Requests no route matched share the label [`UNMATCHED_PATH`].
pub async fn track_metrics(
    State(metrics): State<Arc<HttpMetrics>>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let path = match req.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_owned(),
        None => UNMATCHED_PATH.to_owned(),
    };
    let method = req.method().to_string();

    let response = next.run(req).await;

    let status = response.status();
    let status_text = status.canonical_reason().unwrap_or(status.as_str());
    metrics.observe(&path, &method, status_text, start.elapsed());

    response
}
