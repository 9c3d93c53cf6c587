//! Batch builder (spec §4.2.4): flushes on a count or byte threshold,
//! whichever fires first, or a time-window timer; assigns strictly
//! increasing batch ids and optionally compresses the serialized payload.

use std::collections::HashMap;

use logline_protocol::{Batch, Compression, LogEntry};

pub struct Batcher {
    agent_id: String,
    next_batch_id: u64,
    buffer: Vec<LogEntry>,
    buffer_bytes: usize,
}

impl Batcher {
    pub fn new(agent_id: String) -> Self {
        Self {
            agent_id,
            next_batch_id: 1,
            buffer: Vec::new(),
            buffer_bytes: 0,
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        self.buffer_bytes += serialized_len(&entry);
        self.buffer.push(entry);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Whether pushing `entry` next would cross either threshold (spec
    /// §4.2.4: "whichever fires first"). Checked *before* the push, so a
    /// threshold of `max_count` flushes a batch of exactly that many
    /// entries (boundary #11: "the 101st entry triggers a flush containing
    /// the first 100"), holding the triggering entry back for the batch
    /// that follows instead of folding it into an oversized one.
    pub fn would_exceed(&self, max_count: usize, max_bytes: usize, entry: &LogEntry) -> bool {
        self.buffer.len() >= max_count || self.buffer_bytes + serialized_len(entry) > max_bytes
    }

    /// Drains the buffer into a [`Batch`], assigning the next strictly
    /// increasing `batch_id` (spec §3 invariant) and attempting compression
    /// when requested. A compression failure falls back to an uncompressed
    /// batch rather than dropping it (spec §7).
    pub fn flush(&mut self, compress: bool, sampling_rate_label: &str, emit_time_ms: i64) -> Batch {
        let logs = std::mem::take(&mut self.buffer);
        self.buffer_bytes = 0;
        let batch_id = self.next_batch_id;
        self.next_batch_id += 1;

        let mut original_size = 0u64;
        let mut serialized = Vec::new();
        for entry in &logs {
            if let Ok(bytes) = serde_json::to_vec(entry) {
                original_size += bytes.len() as u64;
                serialized.extend_from_slice(&bytes);
                serialized.push(b'\n');
            }
        }

        let mut metadata = HashMap::new();
        metadata.insert("sampling_rate".to_string(), sampling_rate_label.to_string());
        metadata.insert("agent_build".to_string(), env!("CARGO_PKG_VERSION").to_string());

        let (compression, compressed_payload) = if compress && !serialized.is_empty() {
            match zstd::stream::encode_all(&serialized[..], 0) {
                Ok(compressed) => (Compression::Zstd, Some(compressed)),
                Err(err) => {
                    tracing::warn!(error = %err, "zstd compression failed, sending batch uncompressed");
                    (Compression::None, None)
                }
            }
        } else {
            (Compression::None, None)
        };

        Batch {
            agent_id: self.agent_id.clone(),
            batch_id,
            emit_time_ms,
            logs,
            compression,
            compressed_payload,
            original_size,
            metadata,
        }
    }
}

fn serialized_len(entry: &LogEntry) -> usize {
    serde_json::to_vec(entry).map(|b| b.len()).unwrap_or(0)
}
