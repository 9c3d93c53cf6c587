//! Tails log files, parses and samples lines, batches and streams them to
//! the ingestion service (spec §4.2).

pub mod batcher;
pub mod metrics;
pub mod parser;
pub mod policy;
pub mod sampler;
pub mod settings;
pub mod stream_manager;
pub mod tailer;

pub use metrics::{AgentMetrics, AgentState};
pub use policy::Policy;
pub use settings::Settings;

/// Wall-clock milliseconds since epoch, stamped on outgoing batches
/// (spec §3 `emit_time_ms`) - collection time, distinct from the
/// per-entry `timestamp_ns` parsed out of the source line.
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
