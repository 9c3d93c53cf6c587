use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use axum::Router;
use ingest::connection::run_connection;
use ingest::dedup::{DedupCache, run_sweeper};
use ingest::writer::{WriterConfig, run_writer};
use ingest::{IngestState, Settings};
use logline_logging::LogFormat;
use logline_runtime::Shutdown;
use logline_store::{MockStore, Store};
use logline_transport::{IngestSocket, management_router};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logline_logging::init_logging("ingest", "info", LogFormat::Compact);

    let settings = Settings::from_env();
    let shutdown = Shutdown::new();

    let dedup = Arc::new(DedupCache::new(settings.dedup_ttl));
    let inbox_depth = Arc::new(AtomicU64::new(0));
    let state = Arc::new(IngestState::new(dedup.clone(), inbox_depth.clone()));

    // The analytics store itself is out of scope (spec §1 "Non-goals");
    // this process embeds the in-memory store behind the same bulk-insert
    // contract a real store would satisfy.
    let store: Arc<dyn Store> = Arc::new(MockStore::new());

    let (inbox_tx, inbox_rx) = mpsc::channel(settings.inbox_capacity);

    tokio::spawn(run_sweeper(dedup.clone(), settings.dedup_ttl, shutdown.clone()));
    tokio::spawn(run_writer(
        inbox_rx,
        store,
        WriterConfig {
            table: settings.store_table.clone(),
            flush_count: settings.writer_flush_count,
            flush_interval: settings.writer_flush_interval,
        },
        inbox_depth,
        state.clone(),
        shutdown.clone(),
    ));

    let stream_state = state.clone();
    let stream_app: Router = IngestSocket::router(move |socket| {
        let state = stream_state.clone();
        let inbox_tx = inbox_tx.clone();
        async move { run_connection(socket, state, inbox_tx).await }
    });
    let management_app: Router = management_router(state.clone());

    let stream_listener = tokio::net::TcpListener::bind(settings.stream_addr).await?;
    let management_listener = tokio::net::TcpListener::bind(settings.management_addr).await?;

    tracing::info!(
        stream_addr = %settings.stream_addr,
        management_addr = %settings.management_addr,
        "ingestion service listening",
    );

    let stream_shutdown = shutdown.clone();
    let management_shutdown = shutdown.clone();
    let stream_server = axum::serve(stream_listener, stream_app)
        .with_graceful_shutdown(async move { stream_shutdown.triggered().await });
    let management_server = axum::serve(management_listener, management_app)
        .with_graceful_shutdown(async move { management_shutdown.triggered().await });

    tokio::select! {
        res = stream_server => res?,
        res = management_server => res?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
            shutdown.trigger();
        }
    }

    Ok(())
}
