//! Stream manager (spec §4.2.4, §4.2.5): connects to the ingestion
//! service behind backoff and a circuit breaker (spec §4.4), then runs the
//! batcher/sender loop alongside a concurrent ack-reader context. Once the
//! stream ends - cleanly or with an error - this returns rather than
//! reconnecting; transparent agent-side stream retry is out of scope
//! (open question, spec §7).

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use logline_protocol::{Ack, AckStatus, LogEntry};
use logline_resilience::{Backoff, BackoffConfig, CircuitBreaker, ErrorClass};
use logline_runtime::Shutdown;
use logline_transport::{AgentStream, AgentStreamReceiver, AgentStreamSender};
use tokio::sync::mpsc;

use crate::batcher::Batcher;
use crate::metrics::AgentMetrics;

/// Bound on the shutdown final-flush (spec §5: "best effort, bounded by a
/// shutdown deadline of a few seconds").
const SHUTDOWN_FLUSH_DEADLINE: Duration = Duration::from_secs(3);

enum StreamOutcome {
    Shutdown,
    StreamEnded,
    ChannelClosed,
}

/// Retries the initial connect with exponential backoff while the circuit
/// breaker allows it. Returns `None` once the breaker trips, retries are
/// exhausted, or shutdown preempts the wait.
async fn connect_with_backoff(
    url: &str,
    breaker: &CircuitBreaker,
    shutdown: &Shutdown,
) -> Option<AgentStream> {
    let mut backoff = Backoff::new(BackoffConfig::default());
    loop {
        if !breaker.allow_request() {
            tracing::warn!("stream circuit breaker open, not attempting connect");
            return None;
        }
        match AgentStream::connect(url).await {
            Ok(stream) => {
                breaker.record_success();
                return Some(stream);
            }
            Err(err) => {
                breaker.record_failure();
                if err.class() == ErrorClass::Terminal {
                    tracing::error!(error = %err, "terminal error connecting to ingestion service, not retrying");
                    return None;
                }
                tracing::warn!(error = %err, "failed to connect to ingestion service");
                let Some(delay) = backoff.next_delay() else {
                    tracing::error!("exhausted connect retries to ingestion service");
                    return None;
                };
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = shutdown.triggered() => return None,
                }
            }
        }
    }
}

/// Runs the stream for the lifetime of one connection. Entries parameters
/// mirror the config document's agent settings (spec §4.2.4).
#[allow(clippy::too_many_arguments)]
pub async fn run_stream_manager(
    url: String,
    agent_id: String,
    mut entries: mpsc::Receiver<LogEntry>,
    compression_enabled: bool,
    batch_max_count: usize,
    batch_max_bytes: usize,
    batch_window: Duration,
    metrics: Arc<AgentMetrics>,
    breaker: Arc<CircuitBreaker>,
    shutdown: Shutdown,
) {
    let Some(stream) = connect_with_backoff(&url, &breaker, &shutdown).await else {
        tracing::error!("giving up on the ingestion stream; this agent will not tail further");
        return;
    };

    metrics.stream_connected.store(true, Ordering::Relaxed);
    let (mut sender, receiver) = stream.split();

    let (ack_tx, mut ack_rx) = mpsc::channel(64);
    let ack_task = tokio::spawn(run_ack_reader(receiver, ack_tx, shutdown.clone()));

    let outcome = run_send_loop(
        &mut sender,
        &mut entries,
        &mut ack_rx,
        &agent_id,
        compression_enabled,
        batch_max_count,
        batch_max_bytes,
        batch_window,
        &metrics,
        &shutdown,
    )
    .await;

    metrics.stream_connected.store(false, Ordering::Relaxed);
    let _ = sender.close().await;
    ack_task.abort();

    match outcome {
        StreamOutcome::Shutdown => tracing::info!("stream manager stopping for shutdown"),
        StreamOutcome::StreamEnded => {
            tracing::warn!("ingestion stream ended, not reconnecting")
        }
        StreamOutcome::ChannelClosed => {
            tracing::info!("entries channel closed, stream manager stopping")
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_send_loop(
    sender: &mut AgentStreamSender,
    entries: &mut mpsc::Receiver<LogEntry>,
    ack_rx: &mut mpsc::Receiver<Ack>,
    agent_id: &str,
    compression_enabled: bool,
    batch_max_count: usize,
    batch_max_bytes: usize,
    batch_window: Duration,
    metrics: &AgentMetrics,
    shutdown: &Shutdown,
) -> StreamOutcome {
    let mut batcher = Batcher::new(agent_id.to_string());
    let mut window = tokio::time::interval(batch_window);
    window.tick().await; // first tick fires immediately, discard

    loop {
        tokio::select! {
            maybe_entry = entries.recv() => {
                match maybe_entry {
                    Some(entry) => {
                        if batcher.would_exceed(batch_max_count, batch_max_bytes, &entry)
                            && !flush_and_send(&mut batcher, sender, compression_enabled, metrics).await
                        {
                            return StreamOutcome::StreamEnded;
                        }
                        batcher.push(entry);
                    }
                    None => {
                        if !batcher.is_empty() {
                            let _ = flush_and_send(&mut batcher, sender, compression_enabled, metrics).await;
                        }
                        return StreamOutcome::ChannelClosed;
                    }
                }
            }
            _ = window.tick() => {
                if !batcher.is_empty()
                    && !flush_and_send(&mut batcher, sender, compression_enabled, metrics).await
                {
                    return StreamOutcome::StreamEnded;
                }
            }
            maybe_ack = ack_rx.recv() => {
                match maybe_ack {
                    Some(ack) => record_ack(&ack, metrics),
                    None => return StreamOutcome::StreamEnded,
                }
            }
            _ = shutdown.triggered() => {
                if !batcher.is_empty() {
                    let flush = flush_and_send(&mut batcher, sender, compression_enabled, metrics);
                    if logline_runtime::time::timeout(SHUTDOWN_FLUSH_DEADLINE, flush).await.is_err() {
                        tracing::warn!("shutdown flush did not complete within the deadline, dropping it");
                    }
                }
                return StreamOutcome::Shutdown;
            }
        }
    }
}

/// Flushes the batcher and sends the result. Returns `false` on a send
/// failure, the signal to the caller that the stream has ended.
async fn flush_and_send(
    batcher: &mut Batcher,
    sender: &mut AgentStreamSender,
    compression_enabled: bool,
    metrics: &AgentMetrics,
) -> bool {
    let emit_time_ms = crate::now_ms();
    let batch = batcher.flush(compression_enabled, "1.0", emit_time_ms);
    match sender.send_batch(&batch).await {
        Ok(()) => {
            metrics.batches_sent.fetch_add(1, Ordering::Relaxed);
            true
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to send batch, stream ending");
            false
        }
    }
}

fn record_ack(ack: &Ack, metrics: &AgentMetrics) {
    match ack.status {
        AckStatus::Success => metrics.acks_success.fetch_add(1, Ordering::Relaxed),
        AckStatus::Retry => metrics.acks_retry.fetch_add(1, Ordering::Relaxed),
        AckStatus::Drop => metrics.acks_drop.fetch_add(1, Ordering::Relaxed),
    };
}

async fn run_ack_reader(mut receiver: AgentStreamReceiver, tx: mpsc::Sender<Ack>, shutdown: Shutdown) {
    loop {
        tokio::select! {
            res = receiver.recv_ack() => {
                match res {
                    Ok(Some(ack)) => {
                        if tx.send(ack).await.is_err() {
                            return;
                        }
                    }
                    Ok(None) => return,
                    Err(err) => {
                        tracing::warn!(error = %err, "ack stream error");
                        return;
                    }
                }
            }
            _ = shutdown.triggered() => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logline_resilience::CircuitBreakerConfig;

    #[tokio::test]
    async fn connect_gives_up_once_shutdown_fires() {
        let breaker = CircuitBreaker::new("ingestion", CircuitBreakerConfig::default());
        let shutdown = Shutdown::new();
        let waiter = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            waiter.trigger();
        });

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            connect_with_backoff("ws://127.0.0.1:1/stream", &breaker, &shutdown),
        )
        .await
        .expect("should not hang past shutdown");
        assert!(result.is_none());
    }

    #[test]
    fn record_ack_buckets_by_status() {
        let metrics = AgentMetrics::default();
        record_ack(&Ack { batch_id: 1, status: AckStatus::Success, message: String::new(), server_timestamp_ms: 0 }, &metrics);
        record_ack(&Ack { batch_id: 2, status: AckStatus::Retry, message: String::new(), server_timestamp_ms: 0 }, &metrics);
        record_ack(&Ack { batch_id: 3, status: AckStatus::Drop, message: String::new(), server_timestamp_ms: 0 }, &metrics);
        assert_eq!(metrics.acks_success.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.acks_retry.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.acks_drop.load(Ordering::Relaxed), 1);
    }
}
