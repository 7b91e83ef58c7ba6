//! A fair reader-writer lock built from scratch:
//! a spinlock for the bookkeeping, a FIFO of parked requests,
//! and a futex-based parking handle per request.
//!
//! [`RwLock`] owns the data and hands out guards,
//! [`RawRwLock`] is the bare acquire / release protocol.

pub mod demo;
pub mod error;
pub mod parking;
pub mod queue;
pub mod rwlock;
pub mod spin_lock;
pub mod stress;
pub mod waiter;

pub use error::LockError;
pub use rwlock::{RawRwLock, ReadGuard, RwLock, Snapshot, WriteGuard};
pub use waiter::Mode;
