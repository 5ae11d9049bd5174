//! HTTP surface of the poller: a liveness probe and the Prometheus
//! text-format metrics endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use prometheus::{Encoder, TextEncoder};
use tokio::net::TcpListener;

use devpulse_core::{HarvestMetrics, ShutdownHandle};

pub fn router(metrics: Arc<HarvestMetrics>) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/metrics", get(metrics_text))
        .with_state(metrics)
}

/// Serve the router until `shutdown` is requested.
pub async fn serve(
    listener: TcpListener,
    metrics: Arc<HarvestMetrics>,
    shutdown: ShutdownHandle,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "metrics endpoint listening");
    }
    axum::serve(listener, router(metrics))
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await
}

async fn liveness() -> &'static str {
    "ok"
}

async fn metrics_text(State(metrics): State<Arc<HarvestMetrics>>) -> impl IntoResponse {
    let families = metrics.registry().gather();
    let mut buffer = Vec::new();
    match TextEncoder::new().encode(&families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            buffer,
        )
            .into_response(),
        Err(error) => {
            tracing::error!(%error, "failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
