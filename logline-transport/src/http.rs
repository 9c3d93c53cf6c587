//! Management endpoints (§6 "Health endpoint" / "Metrics endpoint"), mounted
//! on a separate router from the stream/config traffic in every service.

use async_trait::async_trait;
use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub healthy: bool,
    pub uptime_seconds: u64,
    /// Free-form service-specific fields (queue depths, connectivity flags, etc).
    pub details: serde_json::Value,
}

#[async_trait]
pub trait HealthReporter: Send + Sync + 'static {
    async fn health(&self) -> HealthReport;
}

pub trait MetricsReporter: Send + Sync + 'static {
    fn metrics(&self) -> serde_json::Value;
}

pub fn management_router<S>(state: Arc<S>) -> Router
where
    S: HealthReporter + MetricsReporter,
{
    Router::new()
        .route("/health", get(health_handler::<S>))
        .route("/metrics", get(metrics_handler::<S>))
        .with_state(state)
}

async fn health_handler<S: HealthReporter>(State(state): State<Arc<S>>) -> impl IntoResponse {
    let report = state.health().await;
    let status = if report.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}

async fn metrics_handler<S: MetricsReporter>(State(state): State<Arc<S>>) -> impl IntoResponse {
    Json(state.metrics())
}
