//! Receives agent log streams, deduplicates, buffers, and bulk-inserts
//! into the analytics store (spec §4.3).

pub mod connection;
pub mod dedup;
pub mod metrics;
pub mod settings;
pub mod writer;

pub use metrics::{IngestMetrics, IngestState};
pub use settings::Settings;
