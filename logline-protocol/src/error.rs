//! Error types shared across the log pipeline wire format.

use std::fmt;

/// Result type alias for protocol operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or validating protocol messages.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A config document could not be parsed as YAML.
    #[error("config document parse error: {0}")]
    ConfigParse(String),

    /// A sampling rate fell outside `[0.0, 1.0]`.
    #[error("invalid sampling rate {rate} for {context}")]
    InvalidRate { context: String, rate: f64 },

    /// A batch was built with an out-of-order or non-monotonic batch id.
    #[error(
        "batch_id {got} is not greater than previous batch_id {previous} for agent {agent_id}"
    )]
    NonMonotonicBatch {
        agent_id: String,
        previous: u64,
        got: u64,
    },

    /// The compressed payload did not decode to valid entry bytes.
    #[error("decompression failed: {0}")]
    Decompression(String),
}

/// Coarse classification of [`Error`], useful for metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParse,
    InvalidRate,
    NonMonotonicBatch,
    Decompression,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::ConfigParse => "ConfigParse",
            ErrorCode::InvalidRate => "InvalidRate",
            ErrorCode::NonMonotonicBatch => "NonMonotonicBatch",
            ErrorCode::Decompression => "Decompression",
        };
        write!(f, "{name}")
    }
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigParse(_) => ErrorCode::ConfigParse,
            Error::InvalidRate { .. } => ErrorCode::InvalidRate,
            Error::NonMonotonicBatch { .. } => ErrorCode::NonMonotonicBatch,
            Error::Decompression(_) => ErrorCode::Decompression,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::ConfigParse(err.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
