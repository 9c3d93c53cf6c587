//! Environment configuration for the config service (spec §6 "Environment
//! configuration").

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Backing file the service re-reads on a fixed cadence.
    pub source_path: PathBuf,
    /// Address the `/config` request/response channel binds to.
    pub listen_addr: SocketAddr,
    /// Address `/health` and `/metrics` bind to.
    pub management_addr: SocketAddr,
    /// Re-read cadence (spec design target: 10s).
    pub poll_interval: Duration,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            source_path: std::env::var("CONFIG_SOURCE_PATH")
                .unwrap_or_else(|_| "config.yaml".to_string())
                .into(),
            listen_addr: std::env::var("CONFIG_SERVICE_ADDR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| "0.0.0.0:8081".parse().unwrap()),
            management_addr: std::env::var("CONFIG_SERVICE_MANAGEMENT_ADDR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| "0.0.0.0:8082".parse().unwrap()),
            poll_interval: std::env::var("CONFIG_POLL_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(10)),
        }
    }
}
