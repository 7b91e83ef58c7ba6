//! # Queued reader-writer lock
//!
//! Many readers or one writer. Whoever can't get in right away waits in a FIFO queue
//! and sleeps until a releaser hands the lock over:
//! - the last reader out hands it to the writer at the head of the queue
//! - a writer out hands it to the next writer, or to all the readers at the head
//!   of the queue at once (a batch), stopping at the first writer behind them
//!
//! There's no try / timed acquisition, no recursion and no upgrade or downgrade.
//! Acquisition only fails when the wait queue can't grow, and the lock is
//! untouched in that case.

mod guarded;
mod raw;

pub use guarded::{ReadGuard, RwLock, WriteGuard};
pub use raw::{RawRwLock, Snapshot};
