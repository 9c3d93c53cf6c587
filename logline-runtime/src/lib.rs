//! Shutdown coordination shared by every long-running context in the agent
//! and ingestion service.
//!
//! Per spec §5, every blocking suspension point (channel send/recv, stream
//! I/O, filesystem notification wait, poll timer, dedup expiry timer) must
//! honour a cancellation signal derived from a service-wide shutdown
//! request. [`Shutdown`] is that signal: cheap to clone, readable without a
//! lock, and broadcastable to every context at once.

pub mod snapshot;
pub mod time;

pub use snapshot::Snapshot;

use std::sync::Arc;

use tokio::sync::watch;

/// A service-wide shutdown signal. Clone and hand one to every context that
/// needs to stop cooperatively; call [`Shutdown::trigger`] once from the
/// orchestrator (typically a ctrl-c handler).
#[derive(Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// True once [`trigger`](Self::trigger) has been called.
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Signal every clone of this handle to stop. Idempotent.
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }

    /// Resolves once [`trigger`](Self::trigger) is called. Use in
    /// `tokio::select!` alongside a context's normal suspension point so
    /// shutdown preempts it.
    pub async fn triggered(&self) {
        let mut rx = self.rx.clone();
        if *rx.borrow() {
            return;
        }
        let _ = rx.changed().await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
