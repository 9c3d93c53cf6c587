//! Wires [`DocumentStore`] to the three things the rest of the system
//! expects of a config service: the `/config` request/response channel
//! (spec §6), and the ambient `/health` + `/metrics` endpoints (§10.2 of
//! SPEC_FULL.md).

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use logline_transport::{ConfigRequest, ConfigResponse, HealthReport, HealthReporter, MetricsReporter};
use logline_transport::config::ConfigSource;

use crate::document_store::DocumentStore;

pub struct ConfigService {
    documents: DocumentStore,
    started_at: Instant,
}

impl ConfigService {
    pub fn new() -> Self {
        Self {
            documents: DocumentStore::new(),
            started_at: Instant::now(),
        }
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigSource for ConfigService {
    /// Spec §4.1 `GetConfig(agent_id, current_version)`: echoes the
    /// current version unconditionally, and includes the payload only when
    /// the caller's version doesn't already match.
    async fn get_config(&self, req: ConfigRequest) -> ConfigResponse {
        match &*self.documents.current() {
            None => ConfigResponse {
                version: String::new(),
                payload: String::new(),
            },
            Some(doc) => {
                if req.current_version == doc.version {
                    tracing::debug!(agent_id = %req.agent_id, version = %doc.version, "agent already current");
                    ConfigResponse {
                        version: doc.version.clone(),
                        payload: String::new(),
                    }
                } else {
                    tracing::info!(agent_id = %req.agent_id, from = %req.current_version, to = %doc.version, "serving new config version");
                    ConfigResponse {
                        version: doc.version.clone(),
                        payload: String::from_utf8_lossy(&doc.bytes).into_owned(),
                    }
                }
            }
        }
    }
}

#[async_trait]
impl HealthReporter for ConfigService {
    async fn health(&self) -> HealthReport {
        let loaded = self.documents.current().is_some();
        HealthReport {
            healthy: loaded,
            uptime_seconds: self.started_at.elapsed().as_secs(),
            details: serde_json::json!({
                "document_loaded": loaded,
                "document_age_seconds": self.documents.age_seconds(),
                "reload_successes": self.documents.reload_successes(),
                "reload_failures": self.documents.reload_failures(),
            }),
        }
    }
}

impl MetricsReporter for ConfigService {
    fn metrics(&self) -> serde_json::Value {
        serde_json::json!({
            "reload_successes": self.documents.reload_successes(),
            "reload_failures": self.documents.reload_failures(),
            "document_age_seconds": self.documents.age_seconds(),
        })
    }
}

pub type SharedConfigService = Arc<ConfigService>;
