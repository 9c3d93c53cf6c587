//! Structured logging setup, shared by the agent, config service, and
//! ingestion service. Grounded in the teacher's CLI logging initialization:
//! an `EnvFilter` built from `RUST_LOG` (falling back to a configured
//! default) layered onto a `tracing-subscriber` formatter selected by
//! output format.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Rendering chosen for the `tracing-subscriber` fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One-line key=value output, good for local development.
    #[default]
    Compact,
    /// JSON lines, good for shipping to a log aggregator.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "compact" | "" => Ok(Self::Compact),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Initializes the global `tracing` subscriber for a service binary.
/// `default_level` is used when `RUST_LOG` is unset. Call once, at the top
/// of `main`.
pub fn init(service: &str, default_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).init(),
    }

    tracing::info!(service, "logging initialized");
}
