//! Per-connected-agent stream context (spec §4.3.1): one task per socket,
//! draining batches, deduplicating, forwarding to the writer inbox, and
//! acking the agent.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use logline_protocol::{Ack, AckStatus, Batch, Compression, LogEntry};
use logline_transport::IngestSocket;
use tokio::sync::mpsc;

use crate::metrics::IngestState;

pub async fn run_connection(mut socket: IngestSocket, state: Arc<IngestState>, inbox: mpsc::Sender<LogEntry>) {
    loop {
        let batch = match socket.recv_batch().await {
            Ok(Some(batch)) => batch,
            Ok(None) => return,
            Err(err) => {
                tracing::warn!(error = %err, "stream receive error, closing connection");
                return;
            }
        };

        let ack = handle_batch(batch, &state, &inbox).await;
        if let Err(err) = socket.send_ack(&ack).await {
            tracing::warn!(error = %err, "failed to send ack, closing connection");
            return;
        }
    }
}

async fn handle_batch(batch: Batch, state: &IngestState, inbox: &mpsc::Sender<LogEntry>) -> Ack {
    let batch_id = batch.batch_id;
    state.metrics.batches_received.fetch_add(1, Ordering::Relaxed);
    state
        .metrics
        .logs_received
        .fetch_add(batch.logs.len() as u64, Ordering::Relaxed);

    if let Some(payload) = &batch.compressed_payload {
        state
            .metrics
            .bytes_received
            .fetch_add(payload.len() as u64, Ordering::Relaxed);
    }

    if batch.compression == Compression::Zstd {
        let Some(payload) = &batch.compressed_payload else {
            return retry_ack(batch_id, "batch marked compressed but carried no payload");
        };
        match zstd::stream::decode_all(&payload[..]) {
            Ok(decoded) => {
                state
                    .metrics
                    .bytes_decompressed
                    .fetch_add(decoded.len() as u64, Ordering::Relaxed);
            }
            Err(err) => {
                tracing::warn!(batch_id, error = %err, "failed to decompress batch payload");
                return retry_ack(batch_id, "failed to decompress batch payload");
            }
        }
    }

    // The decompressed payload and `batch.logs` are redundant copies of
    // the same entries (open question, spec §7); `logs` is authoritative
    // so the writer path doesn't depend on compression succeeding.
    let total = batch.logs.len();
    let mut forwarded = 0usize;
    for entry in batch.logs {
        if !state.dedup.check_and_insert(&entry.dedup_key()) {
            state.metrics.duplicate.fetch_add(1, Ordering::Relaxed);
            continue;
        }
        if inbox.send(entry).await.is_err() {
            tracing::warn!(batch_id, "writer inbox closed, dropping remaining entries");
            break;
        }
        forwarded += 1;
    }
    state.metrics.processed.fetch_add(forwarded as u64, Ordering::Relaxed);

    Ack {
        batch_id,
        status: AckStatus::Success,
        message: format!("Processed {forwarded}/{total} logs"),
        server_timestamp_ms: ingest_now_ms(),
    }
}

fn retry_ack(batch_id: u64, message: &str) -> Ack {
    Ack {
        batch_id,
        status: AckStatus::Retry,
        message: message.to_string(),
        server_timestamp_ms: ingest_now_ms(),
    }
}

fn ingest_now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::DedupCache;
    use std::collections::HashMap;
    use std::time::Duration;

    fn entry(message: &str) -> LogEntry {
        LogEntry {
            timestamp_ns: 1,
            level: logline_protocol::Level::Info,
            message: message.to_string(),
            source: "app.log".to_string(),
            agent_id: "agent-1".to_string(),
            fields: HashMap::new(),
        }
    }

    fn state() -> Arc<IngestState> {
        let dedup = Arc::new(DedupCache::new(Duration::from_secs(60)));
        let depth = Arc::new(std::sync::atomic::AtomicU64::new(0));
        Arc::new(IngestState::new(dedup, depth))
    }

    #[tokio::test]
    async fn duplicate_entries_within_a_batch_are_collapsed() {
        let state = state();
        let (tx, mut rx) = mpsc::channel(16);
        let batch = Batch {
            agent_id: "agent-1".to_string(),
            batch_id: 1,
            emit_time_ms: 0,
            logs: vec![entry("dup"), entry("dup"), entry("unique")],
            compression: Compression::None,
            compressed_payload: None,
            original_size: 0,
            metadata: HashMap::new(),
        };

        let ack = handle_batch(batch, &state, &tx).await;
        assert_eq!(ack.status, AckStatus::Success);
        assert_eq!(ack.message, "Processed 2/3 logs");
        drop(tx);
        let mut forwarded = Vec::new();
        while let Some(e) = rx.recv().await {
            forwarded.push(e.message);
        }
        assert_eq!(forwarded, vec!["dup", "unique"]);
    }

    #[tokio::test]
    async fn malformed_compressed_payload_yields_retry_ack() {
        let state = state();
        let (tx, _rx) = mpsc::channel(16);
        let batch = Batch {
            agent_id: "agent-1".to_string(),
            batch_id: 7,
            emit_time_ms: 0,
            logs: vec![entry("x")],
            compression: Compression::Zstd,
            compressed_payload: Some(vec![0xff, 0xff, 0xff]),
            original_size: 0,
            metadata: HashMap::new(),
        };

        let ack = handle_batch(batch, &state, &tx).await;
        assert_eq!(ack.status, AckStatus::Retry);
    }
}
