//! Wire types for the log ingestion pipeline.
//!
//! This crate is the shared vocabulary between the agent and the ingestion
//! service: [`LogEntry`], [`Batch`], [`Ack`], and the [`ConfigDocument`] the
//! config service distributes. Everything here is plain data plus parsing -
//! no transport, no I/O.

pub mod error;
pub mod model;

pub use error::{Error, ErrorCode, Result};
pub use model::*;
