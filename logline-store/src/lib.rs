//! The analytics store is an external collaborator (spec §1, §6); this
//! crate only specifies the bulk-insert contract the ingestion writer
//! depends on, plus an in-memory [`MockStore`] for tests.

mod error;
mod mock;

pub use error::{Result, StoreError};
pub use mock::MockStore;

use async_trait::async_trait;
use logline_protocol::LogEntry;

/// A store the ingestion writer can bulk-insert into. One instance per
/// process; the writer context is the only holder (spec §5).
#[async_trait]
pub trait Store: Send + Sync {
    /// Opens a batch handle against `table`. Rows appended to the handle
    /// are staged, not yet visible, until [`BatchHandle::send`].
    async fn prepare_batch(&self, table: &str) -> Result<Box<dyn BatchHandle>>;
}

/// A staged batch: either every appended row commits, or none does (spec
/// §6 "either all rows succeed or none commits").
#[async_trait]
pub trait BatchHandle: Send {
    fn append(&mut self, entry: &LogEntry);

    /// Commits every appended row. Consumes the handle so a caller cannot
    /// append after sending.
    async fn send(self: Box<Self>) -> Result<usize>;

    /// Discards every appended row without committing.
    async fn abort(self: Box<Self>);
}
