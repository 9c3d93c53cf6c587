//! Wire types shared by the agent and ingestion service: entries, batches,
//! acks, and the configuration document.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Severity of a parsed log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
    Unknown,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Unknown => "UNKNOWN",
        };
        write!(f, "{s}")
    }
}

/// One parsed log record, the atomic unit the agent produces and the store
/// consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Monotonic nanoseconds since epoch, parsed from the source line -
    /// never wall-clock time at collection.
    pub timestamp_ns: i64,
    pub level: Level,
    pub message: String,
    /// Identifier of the file/origin the line was tailed from.
    pub source: String,
    /// Unique producer identifier (the tailing agent).
    pub agent_id: String,
    /// Carries at least `service` and an optional `trace_id`.
    pub fields: HashMap<String, String>,
}

impl LogEntry {
    pub fn service(&self) -> &str {
        self.fields
            .get("service")
            .map(String::as_str)
            .unwrap_or("unknown")
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.fields.get("trace_id").map(String::as_str)
    }

    /// Dedup key per spec §3: `hash(message, level, service)`, deliberately
    /// excluding `timestamp_ns` so bursts of the same event collapse.
    pub fn dedup_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.message.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.level.to_string().as_bytes());
        hasher.update([0u8]);
        hasher.update(self.service().as_bytes());
        let digest = hasher.finalize();
        hex::encode(&digest[..16])
    }
}

/// Compression applied to a batch's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Compression {
    None,
    Zstd,
}

/// The unit of stream transmission from agent to ingestion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    pub agent_id: String,
    /// Strictly increasing, gap-free per agent.
    pub batch_id: u64,
    pub emit_time_ms: i64,
    /// Ordered sequence of entries. Retained alongside the compressed
    /// payload for receiver compatibility (see spec open question on
    /// framing) even when `compression != None`.
    pub logs: Vec<LogEntry>,
    pub compression: Compression,
    /// Present iff `compression != None`; decodes to the concatenated
    /// serialized entries of `logs`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compressed_payload: Option<Vec<u8>>,
    /// Pre-compression byte count, for ratio telemetry.
    pub original_size: u64,
    pub metadata: HashMap<String, String>,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }
}

/// Status a receiver reports for a processed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AckStatus {
    Success,
    Retry,
    Drop,
}

/// Receiver-to-sender reply over the same stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    pub batch_id: u64,
    pub status: AckStatus,
    pub message: String,
    pub server_timestamp_ms: i64,
}

/// A single content-based sampling override: first matching substring wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRule {
    pub pattern: String,
    pub rate: f64,
}

/// The sampling section of a config document.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SamplingPolicy {
    #[serde(default)]
    pub base_rates: HashMap<String, f64>,
    #[serde(default)]
    pub content_rules: Vec<ContentRule>,
}

impl SamplingPolicy {
    /// Rate this policy would apply to `level`/`message`, per spec §4.2.3:
    /// look up the base rate (default 1.0), then let the first matching
    /// content rule override it.
    pub fn rate_for(&self, level: Level, message: &str) -> f64 {
        let mut rate = *self.base_rates.get(&level.to_string()).unwrap_or(&1.0);
        for rule in &self.content_rules {
            if message.contains(&rule.pattern) {
                rate = rule.rate;
                break;
            }
        }
        rate
    }
}

/// Agent-facing tunables carried in the config document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_batch_size_kb")]
    pub batch_size_kb: u64,
    #[serde(default = "default_batch_window_secs")]
    pub batch_window_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    60
}
fn default_batch_size_kb() -> u64 {
    64
}
fn default_batch_window_secs() -> u64 {
    10
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            batch_size_kb: default_batch_size_kb(),
            batch_window_secs: default_batch_window_secs(),
        }
    }
}

/// The opaque-to-transport configuration document the config service
/// serves and the agent applies. `version` is the service's content hash;
/// clients treat it as an equality token, never parse it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigDocument {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub agent_settings: AgentSettings,
    #[serde(default)]
    pub sampling: SamplingPolicy,
}

impl ConfigDocument {
    /// Parse a document body. The caller (config service) stamps `version`
    /// separately from the content hash; a body-embedded version is ignored.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut doc: ConfigDocument = serde_yaml::from_slice(bytes)?;
        for (level, rate) in &doc.sampling.base_rates {
            validate_rate(level, *rate)?;
        }
        for rule in &doc.sampling.content_rules {
            validate_rate(&rule.pattern, rule.rate)?;
        }
        doc.version.clear();
        Ok(doc)
    }

    /// Content hash per spec §4.1: first 8 bytes of SHA-256, hex-encoded.
    pub fn content_hash(bytes: &[u8]) -> String {
        let digest = Sha256::digest(bytes);
        hex::encode(&digest[..8])
    }
}

fn validate_rate(context: &str, rate: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(Error::InvalidRate {
            context: context.to_string(),
            rate,
        });
    }
    Ok(())
}

/// Minimal hex encoding so this crate doesn't need a separate `hex` dependency.
mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        use std::fmt::Write;
        let mut s = String::with_capacity(bytes.len() * 2);
        for b in bytes {
            write!(s, "{b:02x}").unwrap();
        }
        s
    }
}

#[cfg(test)]
#[path = "model_tests.rs"]
mod model_tests;
