//! # Raw reader-writer lock
//!
//! Protects nothing by itself, it's the admission / release protocol only.
//! See [`RwLock`](super::RwLock) for the data-owning version with guards.
//!
//! All the bookkeeping lives behind one [`SpinLock`]:
//! - `active_readers` - readers holding the lock right now
//! - `writer_active` - a writer holds the lock
//! - `queue` - parked requests in arrival order
//!
//! Every operation takes the spinlock, decides, and either returns (fast path)
//! or queues a [`Waiter`] and parks on it (slow path). A parked waiter never updates
//! the counters itself - whoever wakes it has already granted it the lock.
//!
//! ## Lost wake-ups
//! The waiter arms its parker (locks the parker's mutex) *before* the spinlock guard is dropped.
//! A releaser that popped it has to take that mutex to unpark, so it can only get there
//! once the waiter sleeps inside the condvar. Swap those two lines and a wake-up can land
//! before anybody listens for it.
//!
//! ## Fairness
//! Queued requests are granted strictly in arrival order, readers and writers alike.
//! A reader may skip the queue only when it is empty and no writer is active.
//! Once anything is queued every newcomer queues too, so a queued writer can't be
//! overtaken by a stream of fresh readers.

use std::sync::Arc;

use log::{debug, trace};

use crate::{
    error::LockError,
    queue::WaiterQueue,
    spin_lock::{SpinGuard, SpinLock},
    waiter::{Mode, Waiter},
};

pub struct RawRwLock {
    state: SpinLock<LockState>,
}

struct LockState {
    active_readers: usize,
    writer_active: bool,
    queue: WaiterQueue,
}

/// A point-in-time copy of the lock's bookkeeping.
///
/// Out of date the moment it's returned, good for tests and diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub active_readers: usize,
    pub writer_active: bool,
    /// Queued modes, head first.
    pub queued: Vec<Mode>,
}

impl Snapshot {
    pub fn is_idle(&self) -> bool {
        self.active_readers == 0 && !self.writer_active
    }
}

impl RawRwLock {
    pub const fn new() -> Self {
        Self {
            state: SpinLock::new(LockState {
                active_readers: 0,
                writer_active: false,
                queue: WaiterQueue::new(),
            }),
        }
    }

    pub fn acquire_read(&self) -> Result<(), LockError> {
        let mut state = self.state.lock();
        if !state.writer_active && state.queue.is_empty() {
            state.active_readers += 1;
            let readers = state.active_readers;
            drop(state);
            trace!("read granted on the fast path, {readers} readers");
            return Ok(());
        }
        Self::park(state, Mode::Read)
    }

    pub fn release_read(&self) {
        let mut state = self.state.lock();
        debug_assert!(state.active_readers > 0, "release_read without a reader");
        debug_assert!(!state.writer_active, "release_read while write-locked");
        state.active_readers -= 1;
        if state.active_readers > 0 {
            return;
        }

        // readers only queue behind something, and the last write release
        // stops its batch at a writer => the head can only be a writer here
        debug_assert!(
            state.queue.peek_front().map_or(true, |w| w.is_writer()),
            "a reader is queued at the head behind active readers"
        );
        let grant = state.hand_off();
        drop(state);
        grant.log();
    }

    pub fn acquire_write(&self) -> Result<(), LockError> {
        let mut state = self.state.lock();
        if !state.writer_active && state.active_readers == 0 {
            state.writer_active = true;
            drop(state);
            trace!("write granted on the fast path");
            return Ok(());
        }
        Self::park(state, Mode::Write)
    }

    pub fn release_write(&self) {
        let mut state = self.state.lock();
        debug_assert!(state.writer_active, "release_write without a writer");
        state.writer_active = false;
        let grant = state.hand_off();
        drop(state);
        grant.log();
    }

    /// Makes the next enqueue fail as if the queue couldn't grow.
    #[cfg(test)]
    fn fail_next_append(&self) {
        self.state.lock().queue.fail_next_append();
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.state.lock();
        Snapshot {
            active_readers: state.active_readers,
            writer_active: state.writer_active,
            queued: state.queue.modes(),
        }
    }

    /// Slow path: queue up, arm, let the spinlock go, sleep.
    fn park(mut state: SpinGuard<'_, LockState>, mode: Mode) -> Result<(), LockError> {
        let waiter = Arc::new(Waiter::new(mode));
        state.queue.try_append(Arc::clone(&waiter))?;
        let ahead = state.queue.len() - 1;

        // must happen before the spinlock guard is dropped
        let armed = waiter.parker().arm();
        drop(state);
        // nothing between here and park: the unparker waits on the armed mutex
        armed.park();

        debug!("{mode} request parked behind {ahead}, woken with the lock granted");
        Ok(())
    }
}

impl Default for RawRwLock {
    fn default() -> Self {
        Self::new()
    }
}

/// Who a release handed the lock to, logged once the spinlock is let go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grant {
    Nobody,
    Writer { still_queued: usize },
    Readers { batch: usize, still_queued: usize },
}

impl Grant {
    fn log(self) {
        match self {
            Grant::Nobody => {}
            Grant::Writer { still_queued } => {
                debug!("write lock handed to the queue head, {still_queued} still queued")
            }
            Grant::Readers {
                batch,
                still_queued,
            } => debug!("read lock handed to a batch of {batch}, {still_queued} still queued"),
        }
    }
}

impl LockState {
    /// Hands the lock from the queue head on, once nobody holds it:
    /// - a writer at the head gets it alone
    /// - readers at the head are all granted together, up to the first writer
    fn hand_off(&mut self) -> Grant {
        debug_assert!(!self.writer_active && self.active_readers == 0);

        let mut batch = 0usize;
        while let Some(is_writer) = self.queue.peek_front().map(|w| w.is_writer()) {
            if is_writer && batch > 0 {
                // the writer waits for the new batch of readers to finish
                break;
            }
            let Some(waiter) = self.queue.pop_front() else {
                break;
            };
            if is_writer {
                self.writer_active = true;
                waiter.parker().unpark();
                return Grant::Writer {
                    still_queued: self.queue.len(),
                };
            }
            self.active_readers += 1;
            batch += 1;
            waiter.parker().unpark();
        }

        if batch == 0 {
            return Grant::Nobody;
        }
        Grant::Readers {
            batch,
            still_queued: self.queue.len(),
        }
    }
}
