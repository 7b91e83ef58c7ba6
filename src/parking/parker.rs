//! # Parker
//! A single-shot parking handle: one thread parks, another one unparks it exactly once.
//!
//! The handle is armed first ([`Parker::arm`] locks its mutex), and only then the
//! caller may let go of whatever made the unparker able to find it (the rwlock's spinlock).
//! [`Parker::unpark`] has to take the same mutex, so it can't signal before
//! [`Armed::park`] is really waiting - that's the whole lost-wakeup story.
//!
//! `notified` survives spurious wake-ups of the condvar.

use super::{
    condvar::Condvar,
    mutex::{Mutex, MutexGuard},
};

pub struct Parker {
    notified: Mutex<bool>,
    cond: Condvar,
}

impl Parker {
    pub const fn new() -> Self {
        Self {
            notified: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    /// Locks the handle. Must be called before the unparker can reach this parker.
    pub fn arm(&self) -> Armed<'_> {
        Armed {
            parker: self,
            guard: self.notified.lock(),
        }
    }

    /// Blocks until the parked thread has released the mutex inside `wait`.
    pub fn unpark(&self) {
        let mut notified = self.notified.lock();
        debug_assert!(!*notified, "parker unparked twice");
        *notified = true;
        self.cond.notify_one();
    }
}

/// An armed parker, holding its mutex until [`Armed::park`] gives it up to wait.
#[must_use = "an armed parker keeps the unparker blocked until it parks"]
pub struct Armed<'a> {
    parker: &'a Parker,
    guard: MutexGuard<'a, bool>,
}

impl Armed<'_> {
    pub fn park(self) {
        let Armed { parker, mut guard } = self;
        while !*guard {
            guard = parker.cond.wait(guard);
        }
    }
}
