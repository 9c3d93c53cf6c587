//! Ambient logging stack shared by every service: structured `tracing`
//! initialization and sanitization of sensitive values before they reach a
//! log sink.

pub mod init;
pub mod sanitization;

pub use init::{LogFormat, init as init_logging};
pub use sanitization::{LogSanitizer, SanitizationConfig, get_sanitizer};

/// Result type for logging operations.
pub type Result<T> = std::result::Result<T, LoggingError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("logging configuration error: {0}")]
    Config(String),
}
