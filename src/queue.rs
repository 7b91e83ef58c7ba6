/*
 * FIFO of parked requests, readers and writers intermixed in arrival order.
 * The order is what makes the rwlock fair, nothing else here is clever.
 *
 * A VecDeque of Arc handles: slots are owned by the deque, waiters by whoever
 * still holds an Arc, so popping never frees a waiter its thread still parks on.
 */

use std::{collections::VecDeque, sync::Arc};

use crate::{
    error::LockError,
    waiter::{Mode, Waiter},
};

pub struct WaiterQueue {
    waiters: VecDeque<Arc<Waiter>>,
    #[cfg(test)]
    fail_next_append: bool,
}

impl WaiterQueue {
    pub const fn new() -> Self {
        Self {
            waiters: VecDeque::new(),
            #[cfg(test)]
            fail_next_append: false,
        }
    }

    /// The next `try_append` fails like a queue that can't grow.
    #[cfg(test)]
    pub(crate) fn fail_next_append(&mut self) {
        self.fail_next_append = true;
    }

    /// Appends at the tail. The slot is reserved first, so on failure the
    /// queue is exactly as it was.
    pub fn try_append(&mut self, waiter: Arc<Waiter>) -> Result<(), LockError> {
        #[cfg(test)]
        if std::mem::take(&mut self.fail_next_append) {
            self.waiters.try_reserve(usize::MAX)?;
        }
        self.waiters.try_reserve(1)?;
        self.waiters.push_back(waiter);
        Ok(())
    }

    pub fn pop_front(&mut self) -> Option<Arc<Waiter>> {
        self.waiters.pop_front()
    }

    pub fn peek_front(&self) -> Option<&Arc<Waiter>> {
        self.waiters.front()
    }

    pub fn is_empty(&self) -> bool {
        self.waiters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.waiters.len()
    }

    /// Queued modes, head first.
    pub fn modes(&self) -> Vec<Mode> {
        self.waiters.iter().map(|w| w.mode()).collect()
    }
}
