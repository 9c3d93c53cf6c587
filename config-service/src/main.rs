use std::sync::Arc;

use axum::Router;
use config_service::{ConfigService, Settings};
use logline_logging::LogFormat;
use logline_runtime::Shutdown;
use logline_transport::config::config_router;
use logline_transport::management_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logline_logging::init_logging("config-service", "info", LogFormat::Compact);

    let settings = Settings::from_env();
    let service = Arc::new(ConfigService::new());
    let shutdown = Shutdown::new();

    // Initial load so the first agent poll doesn't race the watcher.
    if let Err(err) = service.documents().reload(&settings.source_path).await {
        tracing::warn!(error = %err, "no config document loaded at startup, serving defaults");
    }

    tokio::spawn(watch_loop(service.clone(), settings.clone(), shutdown.clone()));

    let config_app: Router = config_router(service.clone());
    let management_app: Router = management_router(service.clone());

    let config_listener = tokio::net::TcpListener::bind(settings.listen_addr).await?;
    let management_listener = tokio::net::TcpListener::bind(settings.management_addr).await?;

    tracing::info!(
        config_addr = %settings.listen_addr,
        management_addr = %settings.management_addr,
        source = %settings.source_path.display(),
        "config service listening",
    );

    let config_shutdown = shutdown.clone();
    let management_shutdown = shutdown.clone();
    let config_server = axum::serve(config_listener, config_app)
        .with_graceful_shutdown(async move { config_shutdown.triggered().await });
    let management_server = axum::serve(management_listener, management_app)
        .with_graceful_shutdown(async move { management_shutdown.triggered().await });

    tokio::select! {
        res = config_server => res?,
        res = management_server => res?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
            shutdown.trigger();
        }
    }

    Ok(())
}

/// Re-reads the source document on a fixed cadence (spec §4.1, design
/// target 10s), stopping once shutdown is signalled.
async fn watch_loop(service: Arc<ConfigService>, settings: Settings, shutdown: Shutdown) {
    let mut ticker = tokio::time::interval(settings.poll_interval);
    ticker.tick().await; // first tick fires immediately; we already loaded once above
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let _ = service.documents().reload(&settings.source_path).await;
            }
            _ = shutdown.triggered() => {
                tracing::info!("config watcher stopping");
                return;
            }
        }
    }
}
