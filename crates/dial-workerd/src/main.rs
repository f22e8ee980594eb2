use std::sync::{Arc, Mutex};

use anyhow::Context;
use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use tracing::info;

use dial_api::{ControlPanelAdapter, HttpApi};
use dial_core::{ControlPanel, PrefetchCounter, TaskDescriptor, TaskRegistry};
use dial_observe::init_logger;
use dial_prometheus::{Encoder, PrometheusMetrics, TextEncoder};

mod config;
use config::WorkerConfig;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    // 1) config
    let cfg = match std::env::args().nth(1) {
        Some(path) => WorkerConfig::load(path.as_ref())?,
        None => WorkerConfig::default(),
    };

    // 2) logger
    init_logger(&cfg.logger)?;
    info!("logger initialized");

    // 3) task registry, seeded with the configured task types
    let mut registry = TaskRegistry::new();
    for seed in &cfg.tasks {
        registry.register(TaskDescriptor::with_defaults(
            &seed.name,
            Arc::new(seed.defaults.clone()),
        ));
    }
    info!(tasks = registry.len(), "task registry seeded");
    let registry = Arc::new(Mutex::new(registry));

    // 4) QoS counter + metrics + control panel
    let qos = Arc::new(PrefetchCounter::new(cfg.initial_prefetch));
    let metrics =
        PrometheusMetrics::new().context("failed to build the prometheus metrics backend")?;
    let panel = ControlPanel::new(registry, qos).with_metrics(Arc::new(metrics.clone()));

    // 5) HTTP control plane + /metrics exposition
    let handler = Arc::new(ControlPanelAdapter::new(Arc::new(panel)));
    let exposition = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(Arc::new(metrics));
    let app = HttpApi::new(handler).router().merge(exposition);

    // 6) serve
    let listener = tokio::net::TcpListener::bind(cfg.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.listen_addr))?;
    info!(addr = %cfg.listen_addr, "control plane listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// GET /metrics
async fn metrics_handler(State(metrics): State<Arc<PrometheusMetrics>>) -> impl IntoResponse {
    let families = metrics.gather();
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    match encoder.encode(&families, &mut buffer) {
        Ok(()) => (
            [(header::CONTENT_TYPE, encoder.format_type().to_string())],
            buffer,
        )
            .into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
