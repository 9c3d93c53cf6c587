//! Config distribution protocol (§6 "Wire protocol — configuration"):
//! request `(agent_id, current_version)`, response `(version, payload)`
//! where `payload` is empty iff the agent already holds the latest version.

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::TransportError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigRequest {
    pub agent_id: String,
    pub current_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub version: String,
    /// Empty iff `current_version` already matched the server's version.
    pub payload: String,
}

/// Server-side source of truth for the config document, implemented by the
/// config service and polled by the generated axum handler below.
#[async_trait]
pub trait ConfigSource: Send + Sync + 'static {
    async fn get_config(&self, req: ConfigRequest) -> ConfigResponse;
}

pub fn config_router<S: ConfigSource>(source: Arc<S>) -> Router {
    Router::new()
        .route("/config", get(config_handler::<S>))
        .with_state(source)
}

async fn config_handler<S: ConfigSource>(
    State(source): State<Arc<S>>,
    Query(req): Query<ConfigRequest>,
) -> Json<ConfigResponse> {
    Json(source.get_config(req).await)
}

/// Client-side call used by the agent's config poller.
pub async fn fetch_config(
    client: &reqwest::Client,
    base_url: &str,
    req: &ConfigRequest,
) -> Result<ConfigResponse, TransportError> {
    let url = format!("{base_url}/config");
    let response = client
        .get(url)
        .query(req)
        .send()
        .await
        .map_err(|e| TransportError::Connection(e.to_string()))?;

    if !response.status().is_success() {
        return Err(TransportError::Protocol(format!(
            "config service returned {}",
            response.status()
        )));
    }

    response
        .json::<ConfigResponse>()
        .await
        .map_err(|e| TransportError::Protocol(e.to_string()))
}
