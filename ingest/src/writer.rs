//! Buffer/writer (spec §4.3.3): drains the deduplicated inbox and
//! bulk-inserts into the store on a count or time threshold, whichever
//! fires first. A failed insert discards the staged slice - there is no
//! persistent retry on store failure (open question, spec §7); the ack
//! already sent to the agent is not revisited.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use logline_protocol::LogEntry;
use logline_runtime::Shutdown;
use logline_store::Store;
use tokio::sync::mpsc;

use crate::metrics::IngestState;

/// Bound on the shutdown final-flush (spec §5: "best effort, bounded by a
/// shutdown deadline of a few seconds").
const SHUTDOWN_FLUSH_DEADLINE: Duration = Duration::from_secs(3);

pub struct WriterConfig {
    pub table: String,
    pub flush_count: usize,
    pub flush_interval: Duration,
}

pub async fn run_writer(
    mut inbox: mpsc::Receiver<LogEntry>,
    store: Arc<dyn Store>,
    config: WriterConfig,
    depth: Arc<AtomicU64>,
    state: Arc<IngestState>,
    shutdown: Shutdown,
) {
    let mut buffer: Vec<LogEntry> = Vec::new();
    let mut timer = tokio::time::interval(config.flush_interval);
    timer.tick().await; // discard the immediate first tick

    loop {
        tokio::select! {
            maybe_entry = inbox.recv() => {
                match maybe_entry {
                    Some(entry) => {
                        buffer.push(entry);
                        depth.store(buffer.len() as u64, Ordering::Relaxed);
                        if buffer.len() >= config.flush_count {
                            flush(&mut buffer, &store, &config.table, &depth, &state).await;
                        }
                    }
                    None => {
                        flush(&mut buffer, &store, &config.table, &depth, &state).await;
                        return;
                    }
                }
            }
            _ = timer.tick() => {
                if !buffer.is_empty() {
                    flush(&mut buffer, &store, &config.table, &depth, &state).await;
                }
            }
            _ = shutdown.triggered() => {
                while let Ok(entry) = inbox.try_recv() {
                    buffer.push(entry);
                }
                let flush = flush(&mut buffer, &store, &config.table, &depth, &state);
                if logline_runtime::time::timeout(SHUTDOWN_FLUSH_DEADLINE, flush).await.is_err() {
                    tracing::warn!("shutdown flush did not complete within the deadline, dropping it");
                }
                return;
            }
        }
    }
}

async fn flush(
    buffer: &mut Vec<LogEntry>,
    store: &Arc<dyn Store>,
    table: &str,
    depth: &AtomicU64,
    state: &IngestState,
) {
    if buffer.is_empty() {
        return;
    }
    let staged = std::mem::take(buffer);
    depth.store(0, Ordering::Relaxed);

    let mut handle = match store.prepare_batch(table).await {
        Ok(handle) => handle,
        Err(err) => {
            tracing::warn!(error = %err, count = staged.len(), "failed to prepare store batch, discarding");
            state
                .metrics
                .inserts_failed
                .fetch_add(staged.len() as u64, Ordering::Relaxed);
            return;
        }
    };
    for entry in &staged {
        handle.append(entry);
    }

    match handle.send().await {
        Ok(count) => {
            state.metrics.inserted.fetch_add(count as u64, Ordering::Relaxed);
            state.record_insert_success().await;
        }
        Err(err) => {
            tracing::warn!(error = %err, count = staged.len(), "store insert failed, discarding batch");
            state
                .metrics
                .inserts_failed
                .fetch_add(staged.len() as u64, Ordering::Relaxed);
        }
    }
}
