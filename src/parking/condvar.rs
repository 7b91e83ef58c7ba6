//! # Condition variable
//!
//! `wait` unlocks the mutex, sleeps until a notification, then locks the mutex again.
//! The futex's atomic is used as a notification counter, so a notification that
//! lands between the unlock and the `wait` syscall changes the counter and `wait`
//! returns right away instead of missing it.
//!
//! `num_waiters` lets the notifier skip the `wake_one` syscall when nobody is waiting.
//! It's incremented while the mutex is still held, so a notifier that locked
//! the mutex after us is guaranteed to see it.
//!
//! There's no `notify_all`: every [`Parker`](super::Parker) has its own condvar and
//! exactly one thread waiting on it, so `num_waiters` is 0 or 1 and waking one is
//! waking everybody. The parker is armed (mutex held) before anyone can unpark it,
//! so by the time `notify_one` runs the waiter has already counted itself in.
//!
//! Wake-ups may be spurious, callers re-check their condition in a loop.

use std::sync::atomic::Ordering::Relaxed;
use std::sync::atomic::{AtomicU32, AtomicUsize};

use atomic_wait::{wait, wake_one};

use super::mutex::MutexGuard;

pub struct Condvar {
    counter: AtomicU32,
    num_waiters: AtomicUsize,
}

impl Condvar {
    pub const fn new() -> Self {
        Self {
            counter: AtomicU32::new(0),
            num_waiters: AtomicUsize::new(0),
        }
    }

    pub fn notify_one(&self) {
        // 0 => nobody waits, whoever comes later checks its flag under the mutex first
        if self.num_waiters.load(Relaxed) > 0 {
            self.counter.fetch_add(1, Relaxed);
            wake_one(&self.counter);
        }
    }

    /// Takes and returns a guard as a proof that the mutex is locked.
    pub fn wait<'a, Y>(&self, guard: MutexGuard<'a, Y>) -> MutexGuard<'a, Y> {
        self.num_waiters.fetch_add(1, Relaxed);

        let original_counter_value = self.counter.load(Relaxed);
        let mutex = guard.mutex;
        drop(guard);

        // only sleeps if nobody notified since the load above
        wait(&self.counter, original_counter_value);

        self.num_waiters.fetch_sub(1, Relaxed);

        mutex.lock()
    }
}

#[cfg(test)]
mod test {
    use std::{
        thread::{scope, sleep},
        time::Duration,
    };

    use super::super::mutex::Mutex;
    use super::*;

    #[test]
    fn test_condvar() {
        let mutex = Mutex::new(0);
        let condvar = Condvar::new();

        let mut wakeups = 0;
        scope(|s| {
            s.spawn(|| {
                // let the other thread lock and wait first
                sleep(Duration::from_millis(100));
                *mutex.lock() = 123;
                condvar.notify_one();
            });

            let mut g = mutex.lock();
            while *g < 100 {
                g = condvar.wait(g);
                wakeups += 1;
            }

            assert_eq!(*g, 123);
        });

        // the waiting actually happened (and possibly some spurious wakeups)
        assert!(wakeups < 10);
    }
}
