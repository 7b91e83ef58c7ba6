//! A parked lock request.
//!
//! Made by the requesting thread right before it may block, shared with the
//! wait queue as an `Arc`. The releaser pops it, grants the lock and unparks;
//! the requester drops its own `Arc` after waking up. Nobody frees it under the other.

use strum_macros::{Display, EnumString};

use crate::parking::Parker;

/// Which side of the lock a request wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Mode {
    Read,
    Write,
}

pub struct Waiter {
    mode: Mode,
    parker: Parker,
}

impl Waiter {
    pub const fn new(mode: Mode) -> Self {
        Self {
            mode,
            parker: Parker::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_writer(&self) -> bool {
        self.mode == Mode::Write
    }

    pub fn parker(&self) -> &Parker {
        &self.parker
    }
}
