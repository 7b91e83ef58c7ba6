//! # Parking
//! Putting a waiter to sleep and waking it up, built on the futex `wait` / `wake_one`
//! from the [atomic-wait](https://crates.io/crates/atomic-wait) crate:
//! - `wait(&AtomicU32, u32)` - sleeps only if the atomic still holds the value, may wake up spuriously
//! - `wake_one(&AtomicU32)` - wakes a single thread waiting on the same atomic
//!
//! [`mutex::Mutex`] + [`condvar::Condvar`] give the "lock, then wait" shape,
//! [`Parker`] wraps them into the one-shot handle every queued waiter owns.

pub mod condvar;
pub mod mutex;
mod parker;

pub use parker::{Armed, Parker};
