//! Environment configuration for the ingestion service (spec §6
//! "Environment configuration").

use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Settings {
    pub stream_addr: SocketAddr,
    pub management_addr: SocketAddr,
    pub dedup_ttl: Duration,
    pub inbox_capacity: usize,
    pub writer_flush_count: usize,
    pub writer_flush_interval: Duration,
    pub store_table: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            stream_addr: std::env::var("INGESTION_STREAM_ADDR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| "0.0.0.0:9090".parse().unwrap()),
            management_addr: std::env::var("INGESTION_MANAGEMENT_ADDR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| "0.0.0.0:9091".parse().unwrap()),
            dedup_ttl: std::env::var("INGESTION_DEDUP_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(60)),
            inbox_capacity: 1000,
            writer_flush_count: std::env::var("INGESTION_WRITER_FLUSH_COUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            writer_flush_interval: std::env::var("INGESTION_WRITER_FLUSH_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(5)),
            store_table: std::env::var("INGESTION_STORE_TABLE").unwrap_or_else(|_| "logs".to_string()),
        }
    }
}
