//! The service's single loaded document (spec §4.1): many concurrent
//! readers, one writer, reader-preference via [`logline_runtime::Snapshot`].
//! Version changes become visible atomically - readers see either the old
//! `(v, bytes_v)` pair or the new one, never a mix.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use logline_protocol::ConfigDocument;
use logline_runtime::Snapshot;

#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub version: String,
    pub bytes: Vec<u8>,
}

/// Outcome of one reload attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The document's content hash changed; a new version is now live.
    Changed,
    /// The document was read successfully but its hash is unchanged.
    Unchanged,
}

pub struct DocumentStore {
    snapshot: Snapshot<Option<LoadedDocument>>,
    loaded_at_unix_secs: AtomicU64,
    reload_failures: AtomicU64,
    reload_successes: AtomicU64,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            snapshot: Snapshot::new(None),
            loaded_at_unix_secs: AtomicU64::new(0),
            reload_failures: AtomicU64::new(0),
            reload_successes: AtomicU64::new(0),
        }
    }

    /// The currently loaded document, or `None` if one has never loaded
    /// successfully (spec: "if it has never loaded one, it returns an empty
    /// payload with version \"\"").
    pub fn current(&self) -> std::sync::Arc<Option<LoadedDocument>> {
        self.snapshot.load()
    }

    /// Re-reads `path` and, if its content hash differs from the currently
    /// loaded version, atomically publishes the new document. On read
    /// failure the previous version is retained and a warning logged (spec
    /// §4.1 "Failure semantics") - the caller never sees an `Err` that
    /// should be fatal.
    pub async fn reload(&self, path: &Path) -> std::io::Result<ReloadOutcome> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                self.reload_failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(path = %path.display(), error = %err, "config source read failed, retaining previous version");
                return Err(err);
            }
        };

        let version = ConfigDocument::content_hash(&bytes);
        let unchanged = matches!(
            &*self.current(),
            Some(doc) if doc.version == version
        );

        self.reload_successes.fetch_add(1, Ordering::Relaxed);
        self.loaded_at_unix_secs.store(now_unix_secs(), Ordering::Relaxed);

        if unchanged {
            return Ok(ReloadOutcome::Unchanged);
        }

        tracing::info!(version = %version, bytes = bytes.len(), "config document version changed");
        self.snapshot.store(Some(LoadedDocument { version, bytes }));
        Ok(ReloadOutcome::Changed)
    }

    pub fn age_seconds(&self) -> Option<u64> {
        let loaded_at = self.loaded_at_unix_secs.load(Ordering::Relaxed);
        if loaded_at == 0 {
            None
        } else {
            Some(now_unix_secs().saturating_sub(loaded_at))
        }
    }

    pub fn reload_failures(&self) -> u64 {
        self.reload_failures.load(Ordering::Relaxed)
    }

    pub fn reload_successes(&self) -> u64 {
        self.reload_successes.load(Ordering::Relaxed)
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn first_reload_loads_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "version: ignored").unwrap();

        let store = DocumentStore::new();
        assert!(store.current().is_none());

        let outcome = store.reload(file.path()).await.unwrap();
        assert_eq!(outcome, ReloadOutcome::Changed);
        assert!(store.current().is_some());
    }

    #[tokio::test]
    async fn unchanged_content_does_not_bump_version() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "a: 1").unwrap();

        let store = DocumentStore::new();
        store.reload(file.path()).await.unwrap();
        let version_before = store.current().as_ref().as_ref().unwrap().version.clone();

        let outcome = store.reload(file.path()).await.unwrap();
        assert_eq!(outcome, ReloadOutcome::Unchanged);
        assert_eq!(store.current().as_ref().as_ref().unwrap().version, version_before);
    }

    #[tokio::test]
    async fn changed_content_bumps_version() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "a: 1").unwrap();

        let store = DocumentStore::new();
        store.reload(file.path()).await.unwrap();
        let version_before = store.current().as_ref().as_ref().unwrap().version.clone();

        writeln!(file, "a: 2").unwrap();
        let outcome = store.reload(file.path()).await.unwrap();
        assert_eq!(outcome, ReloadOutcome::Changed);
        assert_ne!(store.current().as_ref().as_ref().unwrap().version, version_before);
    }

    #[tokio::test]
    async fn read_failure_retains_previous_version() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "a: 1").unwrap();

        let store = DocumentStore::new();
        store.reload(file.path()).await.unwrap();
        let version_before = store.current().as_ref().as_ref().unwrap().version.clone();

        let missing = file.path().with_extension("missing");
        assert!(store.reload(&missing).await.is_err());
        assert_eq!(store.current().as_ref().as_ref().unwrap().version, version_before);
        assert_eq!(store.reload_failures(), 1);
    }
}
