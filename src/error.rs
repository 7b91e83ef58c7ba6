use std::collections::TryReserveError;

use thiserror::Error;

/// Why an acquire gave up before queuing.
///
/// A failed acquire leaves the lock exactly as it found it: no counters
/// touched, nothing queued, the caller holds nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LockError {
    #[error("failed to grow the wait queue: {0}")]
    WaitQueueFull(#[from] TryReserveError),
}
