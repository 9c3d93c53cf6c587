//! Environment configuration for the agent (spec §6 "Environment
//! configuration").

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub struct Settings {
    pub agent_id: String,
    /// Files to tail, one tailer context per path (spec §4.2.1).
    pub watch_paths: Vec<PathBuf>,
    pub ingestion_ws_url: String,
    pub config_service_url: String,
    pub config_poll_interval: Duration,
    pub management_addr: SocketAddr,
    pub entries_channel_capacity: usize,
    /// Whether the batcher attempts ZSTD compression; not part of the
    /// distributed config document (§6 lists no compression flag there),
    /// so this is a local agent setting.
    pub compression_enabled: bool,
    /// Batcher count threshold (§4.2.4 "design target: 100") — not part of
    /// the config document either, so it lives alongside the other local
    /// agent settings rather than `entries_channel_capacity`, which bounds
    /// the upstream tailer-to-batcher channel, not a single batch's size.
    pub batch_max_count: usize,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            agent_id: std::env::var("AGENT_ID").unwrap_or_else(|_| default_agent_id()),
            watch_paths: std::env::var("AGENT_WATCH_PATHS")
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .collect(),
            ingestion_ws_url: std::env::var("INGESTION_SERVICE_URL")
                .unwrap_or_else(|_| "ws://127.0.0.1:9090/stream".to_string()),
            config_service_url: std::env::var("CONFIG_SERVICE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8081".to_string()),
            config_poll_interval: std::env::var("AGENT_CONFIG_POLL_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(60)),
            management_addr: std::env::var("AGENT_MANAGEMENT_ADDR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| "0.0.0.0:8083".parse().unwrap()),
            entries_channel_capacity: 1000,
            compression_enabled: std::env::var("AGENT_COMPRESSION")
                .ok()
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true),
            batch_max_count: std::env::var("AGENT_BATCH_MAX_COUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
        }
    }
}

/// Falls back to a time-seeded identifier (spec §6: "agent identifier
/// ... defaulting to a time-seeded value").
fn default_agent_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("agent-{nanos:x}")
}
