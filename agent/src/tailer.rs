//! File tailer (spec §4.2.1): backfills from the start of the file, then
//! switches to incremental reads driven by filesystem change
//! notifications. Parsing and sampling happen inline, so the bounded
//! entries channel is the only backpressure point back to the tailer
//! (spec §5).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::Ordering;

use logline_runtime::{Shutdown, Snapshot};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::mpsc;

use crate::metrics::AgentMetrics;
use crate::parser::parse_line;
use crate::policy::Policy;
use crate::sampler::should_keep;
use logline_protocol::LogEntry;

#[derive(Clone)]
pub struct TailerContext {
    pub agent_id: String,
    pub policy: Arc<Snapshot<Policy>>,
    pub sink: mpsc::Sender<LogEntry>,
    pub metrics: Arc<AgentMetrics>,
    pub shutdown: Shutdown,
}

/// Tails one file for the lifetime of the process (or until shutdown). If
/// the file does not exist at startup this logs and returns - other
/// tailers are unaffected (spec §4.2.1).
pub async fn run_tailer(path: PathBuf, ctx: TailerContext) {
    let source = path.display().to_string();

    let mut file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(err) => {
            tracing::warn!(path = %source, error = %err, "tailed file missing at startup, skipping");
            return;
        }
    };

    let mut offset = match consume_available(&mut file, 0, &source, &ctx).await {
        Some(offset) => offset,
        None => return,
    };

    let (tx, mut rx) = mpsc::channel(64);
    let mut watcher = match notify::recommended_watcher(move |res| {
        let _ = tx.blocking_send(res);
    }) {
        Ok(watcher) => watcher,
        Err(err) => {
            tracing::warn!(path = %source, error = %err, "failed to create filesystem watcher");
            return;
        }
    };

    if let Err(err) = watch(&mut watcher, &path) {
        tracing::warn!(path = %source, error = %err, "failed to watch file");
        return;
    }

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Some(Ok(event)) if is_write_like(&event) => {
                        match consume_available(&mut file, offset, &source, &ctx).await {
                            Some(new_offset) => offset = new_offset,
                            None => return,
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => tracing::warn!(path = %source, error = %err, "filesystem watch error"),
                    None => return,
                }
            }
            _ = ctx.shutdown.triggered() => {
                tracing::info!(path = %source, "tailer stopping");
                return;
            }
        }
    }
}

fn watch(watcher: &mut RecommendedWatcher, path: &Path) -> notify::Result<()> {
    watcher.watch(path, RecursiveMode::NonRecursive)
}

fn is_write_like(event: &notify::Event) -> bool {
    matches!(
        event.kind,
        notify::EventKind::Modify(_) | notify::EventKind::Create(_)
    )
}

/// Reads from `offset` to end-of-file, processing every complete
/// (newline-terminated) line; a trailing partial line is left unconsumed
/// for the next read. Returns the new offset, or `None` if shutdown fired
/// mid-read.
async fn consume_available(
    file: &mut tokio::fs::File,
    offset: u64,
    source: &str,
    ctx: &TailerContext,
) -> Option<u64> {
    if file.seek(std::io::SeekFrom::Start(offset)).await.is_err() {
        return Some(offset);
    }
    let mut buf = Vec::new();
    if file.read_to_end(&mut buf).await.is_err() {
        return Some(offset);
    }

    let mut consumed = 0usize;
    for line in buf.split_inclusive(|&b| b == b'\n') {
        if !line.ends_with(b"\n") {
            break;
        }
        consumed += line.len();
        let text = String::from_utf8_lossy(&line[..line.len() - 1]);
        let text = text.trim_end_matches('\r');
        if text.is_empty() {
            continue;
        }

        if !process_line(text, source, ctx).await {
            return None;
        }
    }

    Some(offset + consumed as u64)
}

/// Parses, samples, and forwards one line. Returns `false` if shutdown
/// preempted the channel send.
async fn process_line(text: &str, source: &str, ctx: &TailerContext) -> bool {
    ctx.metrics.lines_tailed.fetch_add(1, Ordering::Relaxed);

    let Some((entry, _format)) = parse_line(text, source, &ctx.agent_id) else {
        ctx.metrics.parse_errors_total.fetch_add(1, Ordering::Relaxed);
        return true;
    };
    ctx.metrics.lines_parsed.fetch_add(1, Ordering::Relaxed);

    let snapshot = ctx.policy.load();
    if !should_keep(&snapshot.sampling, entry.level, &entry.message) {
        ctx.metrics.sampled_out_total.fetch_add(1, Ordering::Relaxed);
        return true;
    }

    tokio::select! {
        res = ctx.sink.send(entry) => res.is_ok(),
        _ = ctx.shutdown.triggered() => false,
    }
}
