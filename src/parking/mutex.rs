//! # Futex mutex
//! The [`SpinLock`](crate::spin_lock::SpinLock) with a u32 state instead of the boolean,
//! so a contended thread can go to sleep through `wait` instead of burning the CPU.
//!
//! States:
//! - `0` - unlocked
//! - `1` - locked, no other threads
//! - `2` - locked, other threads are (or were) waiting
//!
//! Unlocking only calls `wake_one` when the state was `2`, so an uncontended
//! lock / unlock pair makes no syscalls at all.
//!
//! The parker keeps this mutex locked across the moment the rwlock's spinlock
//! is released, which is why it can't be the spinlock: the waker has to sleep
//! here instead of spinning against a thread that is about to block.

use std::{
    cell::UnsafeCell,
    ops::{Deref, DerefMut},
    sync::atomic::{
        AtomicU32,
        Ordering::{Acquire, Relaxed, Release},
    },
};

use atomic_wait::{wait, wake_one};

const UNLOCKED: u32 = 0;
const LOCKED: u32 = 1;
const CONTENDED: u32 = 2;

pub struct Mutex<Y> {
    state: AtomicU32,
    value: UnsafeCell<Y>,
}

/// promise to the compiler that it's safe to share if the underlying value is safe to send
unsafe impl<Y> Sync for Mutex<Y> where Y: Send {}

impl<Y> Mutex<Y> {
    pub const fn new(value: Y) -> Self {
        Self {
            state: AtomicU32::new(UNLOCKED),
            value: UnsafeCell::new(value),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, Y> {
        if self
            .state
            .compare_exchange(UNLOCKED, LOCKED, Acquire, Relaxed)
            .is_err()
        {
            Self::lock_contended(&self.state);
        }
        MutexGuard { mutex: self }
    }

    /// Spin for a bit, then fall back to the wait syscall.
    #[cold]
    fn lock_contended(state: &AtomicU32) {
        let mut spin_count = 0;

        // only check for 1, as 2 means that some other thread already gave up spinning
        while state.load(Relaxed) == LOCKED && spin_count < 100 {
            spin_count += 1;
            std::hint::spin_loop();
        }

        if state
            .compare_exchange(UNLOCKED, LOCKED, Acquire, Relaxed)
            .is_ok()
        {
            return;
        }

        // leave the state as 2 to not lose other potential waiters
        while state.swap(CONTENDED, Acquire) != UNLOCKED {
            wait(state, CONTENDED);
        }
    }
}

pub struct MutexGuard<'a, Y> {
    pub(super) mutex: &'a Mutex<Y>,
}

unsafe impl<Y> Sync for MutexGuard<'_, Y> where Y: Sync {}

impl<Y> Deref for MutexGuard<'_, Y> {
    type Target = Y;
    fn deref(&self) -> &Self::Target {
        // SAFETY: the guard exists only while the mutex is locked
        unsafe { &*self.mutex.value.get() }
    }
}

impl<Y> DerefMut for MutexGuard<'_, Y> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: the guard exists only while the mutex is locked
        unsafe { &mut *self.mutex.value.get() }
    }
}

impl<Y> Drop for MutexGuard<'_, Y> {
    fn drop(&mut self) {
        // wake the thread only if someone switched the state to 2
        if self.mutex.state.swap(UNLOCKED, Release) == CONTENDED {
            wake_one(&self.mutex.state);
        }
    }
}
