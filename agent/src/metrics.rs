//! Agent-side counters, exposed on `/metrics` alongside the circuit
//! breaker's state (SPEC_FULL.md §11 "Circuit breaker metrics").

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use async_trait::async_trait;
use logline_resilience::CircuitBreaker;
use logline_transport::{HealthReport, HealthReporter, MetricsReporter};

use crate::policy::PollerMetrics;

#[derive(Default)]
pub struct AgentMetrics {
    pub lines_tailed: AtomicU64,
    pub lines_parsed: AtomicU64,
    pub parse_errors_total: AtomicU64,
    pub sampled_out_total: AtomicU64,
    pub batches_sent: AtomicU64,
    pub acks_success: AtomicU64,
    pub acks_retry: AtomicU64,
    pub acks_drop: AtomicU64,
    pub stream_connected: std::sync::atomic::AtomicBool,
}

pub struct AgentState {
    pub metrics: Arc<AgentMetrics>,
    pub poller_metrics: Arc<PollerMetrics>,
    pub stream_breaker: Arc<CircuitBreaker>,
    pub started_at: Instant,
}

impl AgentState {
    pub fn new(metrics: Arc<AgentMetrics>, stream_breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            metrics,
            poller_metrics: Arc::new(PollerMetrics::default()),
            stream_breaker,
            started_at: Instant::now(),
        }
    }
}

#[async_trait]
impl HealthReporter for AgentState {
    async fn health(&self) -> HealthReport {
        let connected = self.metrics.stream_connected.load(Ordering::Relaxed);
        HealthReport {
            healthy: connected,
            uptime_seconds: self.started_at.elapsed().as_secs(),
            details: serde_json::json!({
                "stream_connected": connected,
                "circuit_state": format!("{:?}", self.stream_breaker.state()),
            }),
        }
    }
}

impl MetricsReporter for AgentState {
    fn metrics(&self) -> serde_json::Value {
        let m = &self.metrics;
        serde_json::json!({
            "lines_tailed": m.lines_tailed.load(Ordering::Relaxed),
            "lines_parsed": m.lines_parsed.load(Ordering::Relaxed),
            "parse_errors_total": m.parse_errors_total.load(Ordering::Relaxed),
            "sampled_out_total": m.sampled_out_total.load(Ordering::Relaxed),
            "batches_sent": m.batches_sent.load(Ordering::Relaxed),
            "acks_success": m.acks_success.load(Ordering::Relaxed),
            "acks_retry": m.acks_retry.load(Ordering::Relaxed),
            "acks_drop": m.acks_drop.load(Ordering::Relaxed),
            "config_reloads_total": self.poller_metrics.reloads_total.load(Ordering::Relaxed),
            "config_parse_failures_total": self.poller_metrics.parse_failures_total.load(Ordering::Relaxed),
            "config_poll_failures_total": self.poller_metrics.poll_failures_total.load(Ordering::Relaxed),
            "circuit_state": format!("{:?}", self.stream_breaker.state()),
        })
    }
}
