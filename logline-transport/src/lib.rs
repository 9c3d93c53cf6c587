//! Transport layer shared by the agent, the ingestion service, and the
//! config service: a WebSocket-framed `Batch`/`Ack` stream (§6 "Wire
//! protocol — log ingestion"), an HTTP request/response helper for config
//! polling (§6 "Wire protocol — configuration"), and a management router
//! mounting `/health` and `/metrics` (§6).

pub mod config;
pub mod http;
pub mod stream;

use logline_resilience::ErrorClass;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum TransportError {
    #[error("transport configuration error: {0}")]
    Config(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("stream closed")]
    Closed,
}

impl TransportError {
    /// Classifies this error for the retry gate (spec §4.4): connection
    /// failures and an unexpectedly closed stream are worth retrying;
    /// a malformed payload or a bad local configuration will not fix
    /// itself on the next attempt.
    pub fn class(&self) -> ErrorClass {
        match self {
            TransportError::Connection(_) | TransportError::Closed => ErrorClass::Transient,
            TransportError::Config(_) | TransportError::Protocol(_) => ErrorClass::Terminal,
        }
    }
}

pub use config::{ConfigRequest, ConfigResponse, fetch_config};
pub use http::{HealthReport, HealthReporter, MetricsReporter, management_router};
pub use stream::{AgentStream, AgentStreamReceiver, AgentStreamSender, Frame, IngestSocket};
