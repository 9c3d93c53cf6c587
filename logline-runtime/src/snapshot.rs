//! Lock-free reader-preference snapshot swap (spec §9): the agent's live
//! policy and the config service's loaded document are both copy-on-write
//! values published via an atomic pointer swap. Readers take a local `Arc`
//! and never block on a writer, matching the spec's requirement that "no
//! entry should block waiting for a reload".

use std::sync::Arc;

use arc_swap::ArcSwap;

/// A value swapped atomically by a single writer and read by many
/// concurrent readers without taking a lock.
pub struct Snapshot<T> {
    inner: ArcSwap<T>,
}

impl<T> Snapshot<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: ArcSwap::from_pointee(value),
        }
    }

    /// Takes a local reference to the current value. Callers should hold
    /// this for the duration of one logical operation (e.g. sampling one
    /// entry), not across a blocking suspension point.
    pub fn load(&self) -> Arc<T> {
        self.inner.load_full()
    }

    /// Publishes a new value, visible to subsequent `load` calls. Readers
    /// already holding a prior `Arc` keep seeing the old value - there is
    /// no tearing.
    pub fn store(&self, value: T) {
        self.inner.store(Arc::new(value));
    }
}
