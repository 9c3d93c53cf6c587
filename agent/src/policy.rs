//! The agent's live policy snapshot and config poller (spec §4.2.6, §9
//! "reader-preference snapshot swap"): the sampler reads a local `Arc` on
//! every entry; the poller builds a new snapshot off-path and publishes it
//! with a single atomic swap, never blocking a reader.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use logline_protocol::{AgentSettings, ConfigDocument, SamplingPolicy};
use logline_resilience::ErrorClass;
use logline_runtime::{Shutdown, Snapshot};
use logline_transport::config::{ConfigRequest, fetch_config};

/// The live, immutable configuration the pipeline is currently applying.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    pub version: String,
    pub sampling: SamplingPolicy,
    pub agent_settings: AgentSettings,
}

/// Counters for the poller's behaviour, exposed on `/metrics`.
#[derive(Default)]
pub struct PollerMetrics {
    pub reloads_total: AtomicU64,
    pub parse_failures_total: AtomicU64,
    pub poll_failures_total: AtomicU64,
}

/// Runs the config poller loop until shutdown (spec §4.2.6): fetches
/// `(agent_id, live_version)` on a fixed cadence, and on a new payload,
/// atomically swaps the live policy. Parse failures retain the previous
/// policy and never block the pipeline.
pub async fn run_poller(
    client: reqwest::Client,
    base_url: String,
    agent_id: String,
    poll_interval: Duration,
    policy: Arc<Snapshot<Policy>>,
    metrics: Arc<PollerMetrics>,
    shutdown: Shutdown,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let PollOutcome::Stop = poll_once(&client, &base_url, &agent_id, &policy, &metrics).await {
                    tracing::error!("config poller stopping after a terminal error");
                    return;
                }
            }
            _ = shutdown.triggered() => {
                tracing::info!("config poller stopping");
                return;
            }
        }
    }
}

/// Whether the poller should keep ticking. A terminal error (spec §4.4:
/// invalid-argument, not-found, permission-denied, cancelled) will not
/// succeed on a later poll either, so the poller gives up rather than
/// retrying forever on the same fixed cadence.
enum PollOutcome {
    Continue,
    Stop,
}

async fn poll_once(
    client: &reqwest::Client,
    base_url: &str,
    agent_id: &str,
    policy: &Snapshot<Policy>,
    metrics: &PollerMetrics,
) -> PollOutcome {
    let current_version = policy.load().version.clone();
    let req = ConfigRequest {
        agent_id: agent_id.to_string(),
        current_version,
    };

    let response = match fetch_config(client, base_url, &req).await {
        Ok(response) => response,
        Err(err) => {
            metrics.poll_failures_total.fetch_add(1, Ordering::Relaxed);
            if err.class() == ErrorClass::Terminal {
                tracing::error!(error = %err, "terminal config poll error, not retrying");
                return PollOutcome::Stop;
            }
            tracing::warn!(error = %err, "config poll failed, retaining previous policy");
            return PollOutcome::Continue;
        }
    };

    if response.payload.is_empty() {
        return PollOutcome::Continue; // already current
    }

    match ConfigDocument::parse(response.payload.as_bytes()) {
        Ok(doc) => {
            metrics.reloads_total.fetch_add(1, Ordering::Relaxed);
            tracing::info!(version = %response.version, "config reloaded");
            policy.store(Policy {
                version: response.version,
                sampling: doc.sampling,
                agent_settings: doc.agent_settings,
            });
        }
        Err(err) => {
            metrics.parse_failures_total.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(error = %err, "config parse failed, retaining previous policy");
        }
    }
    PollOutcome::Continue
}
