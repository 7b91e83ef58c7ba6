/*
 * A spinlock keeps the thread awake and burns cycles until the lock is free.
 * It's only worth it for very short critical sections - here it guards the
 * rwlock's bookkeeping (counters + wait queue), which is O(1) on every path.
 *
 * No fairness, no bound on spinning. Never fails.
 */

use std::{
    cell::UnsafeCell,
    ops::{Deref, DerefMut},
    sync::atomic::{
        AtomicBool,
        Ordering::{Acquire, Release},
    },
};

pub struct SpinLock<Y> {
    locked: AtomicBool,
    value: UnsafeCell<Y>,
}
// UnsafeCell makes the above definition !Sync => we can't share it between threads
// We promise to the compiler that our type is Sync as long as Y is Send
unsafe impl<Y> Sync for SpinLock<Y> where Y: Send {}

impl<Y> SpinLock<Y> {
    pub const fn new(value: Y) -> Self {
        Self {
            locked: AtomicBool::new(false),
            value: UnsafeCell::new(value),
        }
    }

    pub fn lock(&self) -> SpinGuard<'_, Y> {
        while self.locked.swap(true, Acquire) {
            // Acquire makes sure the previous lock owner has happens-before with the current one
            std::hint::spin_loop();
        }
        SpinGuard { lock: self } // it can't be made by any other means
    }

    #[cfg(test)]
    fn is_locked(&self) -> bool {
        self.locked.load(std::sync::atomic::Ordering::Relaxed)
    }

    #[cfg(test)]
    fn into_inner(self) -> Y {
        self.value.into_inner()
    }
}

// a guard to Deref like &mut and Drop like release
pub struct SpinGuard<'a, Y> {
    lock: &'a SpinLock<Y>,
}

impl<Y> Deref for SpinGuard<'_, Y> {
    type Target = Y;
    fn deref(&self) -> &Self::Target {
        // SAFETY: existence of the guard is caused by locking its lock
        unsafe { &*self.lock.value.get() }
    }
}

impl<Y> DerefMut for SpinGuard<'_, Y> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: existence of the guard is caused by locking its lock
        unsafe { &mut *self.lock.value.get() }
    }
}

impl<Y> Drop for SpinGuard<'_, Y> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Release);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::thread;

    #[test]
    fn test_guard_releases_on_drop() {
        let lock = SpinLock::new(0u32);
        {
            let mut g = lock.lock();
            *g += 1;
            assert!(lock.is_locked());
        }
        assert!(!lock.is_locked());
        assert_eq!(*lock.lock(), 1);
    }

    #[test]
    fn test_exclusive_under_contention() {
        let x = SpinLock::new(Vec::new());
        thread::scope(|s| {
            for i in 0..4 {
                let x = &x;
                s.spawn(move || {
                    for _ in 0..1000 {
                        x.lock().push(i);
                    }
                });
            }
        });
        let v = x.into_inner();
        assert_eq!(v.len(), 4000);
        for i in 0..4 {
            assert_eq!(v.iter().filter(|n| **n == i).count(), 1000);
        }
    }
}
