//! Ingestion counters and health (spec §4.3.4).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use logline_transport::{HealthReport, HealthReporter, MetricsReporter};
use tokio::sync::Mutex as AsyncMutex;

use crate::dedup::DedupCache;

/// A store write is considered current if it succeeded within this window
/// (spec §4.3.4 health criterion).
const STORE_FRESHNESS: Duration = Duration::from_secs(120);

#[derive(Default)]
pub struct IngestMetrics {
    pub batches_received: AtomicU64,
    pub logs_received: AtomicU64,
    pub processed: AtomicU64,
    pub duplicate: AtomicU64,
    pub inserted: AtomicU64,
    pub inserts_failed: AtomicU64,
    pub bytes_received: AtomicU64,
    pub bytes_decompressed: AtomicU64,
}

pub struct IngestState {
    pub metrics: IngestMetrics,
    pub dedup: Arc<DedupCache>,
    pub inbox_depth: Arc<AtomicU64>,
    last_insert_success: AsyncMutex<Option<Instant>>,
    started_at: Instant,
}

impl IngestState {
    pub fn new(dedup: Arc<DedupCache>, inbox_depth: Arc<AtomicU64>) -> Self {
        Self {
            metrics: IngestMetrics::default(),
            dedup,
            inbox_depth,
            // Grace period: healthy for the first freshness window even
            // before the first insert completes.
            last_insert_success: AsyncMutex::new(Some(Instant::now())),
            started_at: Instant::now(),
        }
    }

    pub async fn record_insert_success(&self) {
        *self.last_insert_success.lock().await = Some(Instant::now());
    }

    async fn store_connected(&self) -> bool {
        match *self.last_insert_success.lock().await {
            Some(at) => at.elapsed() < STORE_FRESHNESS,
            None => false,
        }
    }
}

#[async_trait]
impl HealthReporter for IngestState {
    async fn health(&self) -> HealthReport {
        let connected = self.store_connected().await;
        HealthReport {
            healthy: connected,
            uptime_seconds: self.started_at.elapsed().as_secs(),
            details: serde_json::json!({
                "store_connected": connected,
                "inbox_depth": self.inbox_depth.load(Ordering::Relaxed),
                "dedup_cache_size": self.dedup.len(),
            }),
        }
    }
}

impl MetricsReporter for IngestState {
    fn metrics(&self) -> serde_json::Value {
        let m = &self.metrics;
        let logs_received = m.logs_received.load(Ordering::Relaxed);
        let duplicate = m.duplicate.load(Ordering::Relaxed);
        let bytes_received = m.bytes_received.load(Ordering::Relaxed);
        let bytes_decompressed = m.bytes_decompressed.load(Ordering::Relaxed);

        let dedup_rate = if logs_received > 0 {
            duplicate as f64 / logs_received as f64
        } else {
            0.0
        };
        let compression_ratio = if bytes_received > 0 {
            bytes_decompressed as f64 / bytes_received as f64
        } else {
            1.0
        };

        let uptime = self.started_at.elapsed().as_secs_f64().max(1.0);
        let logs_per_second = logs_received as f64 / uptime;

        serde_json::json!({
            "batches_received": m.batches_received.load(Ordering::Relaxed),
            "logs_received": logs_received,
            "processed": m.processed.load(Ordering::Relaxed),
            "duplicate": duplicate,
            "inserted": m.inserted.load(Ordering::Relaxed),
            "inserts_failed": m.inserts_failed.load(Ordering::Relaxed),
            "bytes_received": bytes_received,
            "bytes_decompressed": bytes_decompressed,
            "compression_ratio": compression_ratio,
            "logs_per_second": logs_per_second,
            "dedup_rate": dedup_rate,
            "inbox_depth": self.inbox_depth.load(Ordering::Relaxed),
            "dedup_cache_size": self.dedup.len(),
        })
    }
}
