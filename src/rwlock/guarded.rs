//! # Read-write lock with guards
//! The [`RawRwLock`] plus the data it protects.
//!
//! Guards do the releasing in `Drop`, so a read can't be released as a write,
//! nor released twice, nor forgotten (unless leaked on purpose).

use std::{
    cell::UnsafeCell,
    ops::{Deref, DerefMut},
};

use super::raw::{RawRwLock, Snapshot};
use crate::error::LockError;

pub struct RwLock<Y> {
    raw: RawRwLock,
    value: UnsafeCell<Y>,
}

/// as the RwLock may hand out multiple references to Y to different threads,
/// Y has to be not only Send, but also Sync
unsafe impl<Y> Sync for RwLock<Y> where Y: Send + Sync {}

impl<Y> RwLock<Y> {
    pub const fn new(value: Y) -> Self {
        Self {
            raw: RawRwLock::new(),
            value: UnsafeCell::new(value),
        }
    }

    /// Blocks until the lock is shared with us.
    pub fn read(&self) -> Result<ReadGuard<'_, Y>, LockError> {
        self.raw.acquire_read()?;
        Ok(ReadGuard { lock: self })
    }

    /// Blocks until the lock is ours alone.
    pub fn write(&self) -> Result<WriteGuard<'_, Y>, LockError> {
        self.raw.acquire_write()?;
        Ok(WriteGuard { lock: self })
    }

    pub fn snapshot(&self) -> Snapshot {
        self.raw.snapshot()
    }

    pub fn raw(&self) -> &RawRwLock {
        &self.raw
    }

    // &mut self => nobody else can hold a guard
    pub fn get_mut(&mut self) -> &mut Y {
        self.value.get_mut()
    }

    pub fn into_inner(self) -> Y {
        self.value.into_inner()
    }
}

impl<Y: Default> Default for RwLock<Y> {
    fn default() -> Self {
        Self::new(Y::default())
    }
}

pub struct ReadGuard<'a, Y> {
    lock: &'a RwLock<Y>,
}

impl<Y> Deref for ReadGuard<'_, Y> {
    type Target = Y;
    fn deref(&self) -> &Self::Target {
        // SAFETY: readers only share the lock with other readers
        unsafe { &*self.lock.value.get() }
    }
}

impl<Y> Drop for ReadGuard<'_, Y> {
    fn drop(&mut self) {
        self.lock.raw.release_read();
    }
}

pub struct WriteGuard<'a, Y> {
    lock: &'a RwLock<Y>,
}

/// Write guard also allows to just read the data
impl<Y> Deref for WriteGuard<'_, Y> {
    type Target = Y;
    fn deref(&self) -> &Self::Target {
        // SAFETY: the writer holds the lock alone
        unsafe { &*self.lock.value.get() }
    }
}

impl<Y> DerefMut for WriteGuard<'_, Y> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: the writer holds the lock alone
        unsafe { &mut *self.lock.value.get() }
    }
}

impl<Y> Drop for WriteGuard<'_, Y> {
    fn drop(&mut self) {
        self.lock.raw.release_write();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::{thread, time::Duration};

    #[test]
    fn test_guards_release() {
        let lock = RwLock::new(5);
        {
            let r1 = lock.read().unwrap();
            let r2 = lock.read().unwrap();
            assert_eq!(*r1 + *r2, 10);
            assert_eq!(lock.snapshot().active_readers, 2);
        }
        assert!(lock.snapshot().is_idle());

        *lock.write().unwrap() += 1;
        assert!(lock.snapshot().is_idle());
        assert_eq!(lock.into_inner(), 6);
    }

    #[test]
    fn test_writer_waits_for_reader_guard() {
        let lock = RwLock::new(Vec::new());
        thread::scope(|s| {
            let r = lock.read().unwrap();
            s.spawn(|| lock.write().unwrap().push("writer"));
            while lock.snapshot().queued.is_empty() {
                thread::sleep(Duration::from_millis(1));
            }
            assert!(r.is_empty());
            drop(r);
        });
        assert_eq!(*lock.read().unwrap(), ["writer"]);
    }

    #[test]
    fn test_get_mut() {
        let mut lock = RwLock::new(String::from("a"));
        lock.get_mut().push('b');
        assert_eq!(*lock.read().unwrap(), "ab");
    }
}
