use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use logline_protocol::LogEntry;

use crate::{BatchHandle, Result, Store, StoreError};

/// In-memory store for integration tests against the ingestion pipeline.
/// Can be configured to fail the next `send` to exercise the
/// inserts-failed path (spec §4.3.3).
#[derive(Default)]
pub struct MockStore {
    rows: Arc<Mutex<Vec<LogEntry>>>,
    fail_next_send: Arc<Mutex<bool>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_send(&self) {
        *self.fail_next_send.lock().unwrap() = true;
    }

    pub fn rows(&self) -> Vec<LogEntry> {
        self.rows.lock().unwrap().clone()
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl Store for MockStore {
    async fn prepare_batch(&self, _table: &str) -> Result<Box<dyn BatchHandle>> {
        Ok(Box::new(MockBatchHandle {
            staged: Vec::new(),
            rows: self.rows.clone(),
            fail_next_send: self.fail_next_send.clone(),
        }))
    }
}

struct MockBatchHandle {
    staged: Vec<LogEntry>,
    rows: Arc<Mutex<Vec<LogEntry>>>,
    fail_next_send: Arc<Mutex<bool>>,
}

#[async_trait]
impl BatchHandle for MockBatchHandle {
    fn append(&mut self, entry: &LogEntry) {
        self.staged.push(entry.clone());
    }

    async fn send(self: Box<Self>) -> Result<usize> {
        let mut should_fail = self.fail_next_send.lock().unwrap();
        if *should_fail {
            *should_fail = false;
            return Err(StoreError::Internal("simulated store failure".into()));
        }
        drop(should_fail);
        let count = self.staged.len();
        self.rows.lock().unwrap().extend(self.staged);
        Ok(count)
    }

    async fn abort(self: Box<Self>) {}
}
