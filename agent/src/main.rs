use std::sync::Arc;
use std::time::Duration;

use agent::policy::{Policy, run_poller};
use agent::stream_manager::run_stream_manager;
use agent::tailer::{TailerContext, run_tailer};
use agent::{AgentState, Settings};
use axum::Router;
use logline_logging::LogFormat;
use logline_resilience::{CircuitBreaker, CircuitBreakerConfig};
use logline_runtime::{Shutdown, Snapshot};
use logline_transport::management_router;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env();
    logline_logging::init_logging("agent", "info", LogFormat::Compact);

    let shutdown = Shutdown::new();
    let policy = Arc::new(Snapshot::new(Policy::default()));
    let breaker = Arc::new(CircuitBreaker::new(
        "ingestion-stream",
        CircuitBreakerConfig::default(),
    ));
    let metrics = Arc::new(agent::AgentMetrics::default());
    let state = Arc::new(AgentState::new(metrics.clone(), breaker.clone()));

    tokio::spawn(run_poller(
        reqwest::Client::new(),
        settings.config_service_url.clone(),
        settings.agent_id.clone(),
        settings.config_poll_interval,
        policy.clone(),
        state.poller_metrics.clone(),
        shutdown.clone(),
    ));

    let (entries_tx, entries_rx) = mpsc::channel(settings.entries_channel_capacity);

    if settings.watch_paths.is_empty() {
        tracing::warn!("no AGENT_WATCH_PATHS configured, agent will stream nothing");
    }
    for path in &settings.watch_paths {
        let ctx = TailerContext {
            agent_id: settings.agent_id.clone(),
            policy: policy.clone(),
            sink: entries_tx.clone(),
            metrics: metrics.clone(),
            shutdown: shutdown.clone(),
        };
        tokio::spawn(run_tailer(path.clone(), ctx));
    }
    drop(entries_tx);

    let initial = policy.load();
    let batch_max_count = settings.batch_max_count;
    let batch_max_bytes = (initial.agent_settings.batch_size_kb * 1024) as usize;
    let batch_window = Duration::from_secs(initial.agent_settings.batch_window_secs);

    let stream_handle = tokio::spawn(run_stream_manager(
        settings.ingestion_ws_url.clone(),
        settings.agent_id.clone(),
        entries_rx,
        settings.compression_enabled,
        batch_max_count,
        batch_max_bytes,
        batch_window,
        metrics.clone(),
        breaker,
        shutdown.clone(),
    ));

    let management_app: Router = management_router(state.clone());
    let management_listener = tokio::net::TcpListener::bind(settings.management_addr).await?;

    tracing::info!(
        agent_id = %settings.agent_id,
        ingestion_url = %settings.ingestion_ws_url,
        management_addr = %settings.management_addr,
        watch_paths = ?settings.watch_paths,
        "agent starting",
    );

    let management_shutdown = shutdown.clone();
    let management_server = axum::serve(management_listener, management_app)
        .with_graceful_shutdown(async move { management_shutdown.triggered().await });

    tokio::select! {
        res = management_server => res?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
            shutdown.trigger();
        }
    }

    let _ = stream_handle.await;
    Ok(())
}
