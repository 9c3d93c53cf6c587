//! Config service (spec §4.1): serves a single version-hashed configuration
//! document to any number of agents, periodically re-reading its backing
//! file and publishing version changes atomically.

pub mod document_store;
pub mod service;
pub mod settings;

pub use document_store::{DocumentStore, LoadedDocument, ReloadOutcome};
pub use service::ConfigService;
pub use settings::Settings;
