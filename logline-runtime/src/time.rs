//! Deadline and interval helpers used by the batcher's flush timer, the
//! config poller's cadence, and the dedup cache's expiry sweep.

use std::time::Duration;

/// Timeout error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed;

impl std::fmt::Display for Elapsed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "deadline has elapsed")
    }
}

impl std::error::Error for Elapsed {}

/// Runs a future with a timeout, used to bound the shutdown drain deadline
/// (spec §5: "a few seconds").
pub async fn timeout<F>(duration: Duration, future: F) -> Result<F::Output, Elapsed>
where
    F: std::future::Future,
{
    tokio::time::timeout(duration, future)
        .await
        .map_err(|_| Elapsed)
}

pub use tokio::time::{Instant, Interval, interval, sleep};
