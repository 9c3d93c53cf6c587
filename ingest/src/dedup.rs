//! Dedup cache (spec §4.3.2): a process-local set of recently-seen entry
//! keys with a fixed expiry. Process-local only - a second ingestion
//! instance would not see another's keys (open question, spec §7); the
//! intended deployment is a single active ingester per agent population.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use logline_runtime::Shutdown;

pub struct DedupCache {
    entries: Mutex<HashMap<String, Instant>>,
    ttl: Duration,
}

impl DedupCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Records `key` if unseen (or if its prior sighting has expired).
    /// Returns `true` for a fresh key, `false` for a duplicate.
    pub fn check_and_insert(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(seen_at) if now.duration_since(*seen_at) < self.ttl => false,
            _ => {
                entries.insert(key.to_string(), now);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn sweep(&self) {
        let now = Instant::now();
        let ttl = self.ttl;
        self.entries
            .lock()
            .unwrap()
            .retain(|_, seen_at| now.duration_since(*seen_at) < ttl);
    }
}

/// Periodically drops expired keys so the cache does not grow without
/// bound across a long-running process.
pub async fn run_sweeper(cache: std::sync::Arc<DedupCache>, interval: Duration, shutdown: Shutdown) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => cache.sweep(),
            _ = shutdown.triggered() => return,
        }
    }
}
