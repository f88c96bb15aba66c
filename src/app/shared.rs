//! State shared by every task.
//!
//! The quit flag is the only cancellation primitive: the supervisor sets
//! it, the poll loop and the routine check it.  Routine variables sit
//! behind a mutex; the cycle lock serialises pick-and-place cycles when
//! triggers overlap.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Variables the pick-and-place routine carries between cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RoutineVars {
    /// X coordinate (mm) of the next place position.
    pub x_pos: f32,
    /// Cycles completed in the current row.
    pub count: u32,
    /// Z coordinate (mm) of the place position.
    pub place_height: f32,
    /// A cycle is in progress.
    pub active: bool,
}

#[derive(Debug, Default)]
pub struct SharedState {
    quit: AtomicBool,
    vars: Mutex<RoutineVars>,
    cycle: Mutex<()>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the quit flag.  Returns `true` if this call raised it.
    pub fn request_quit(&self) -> bool {
        !self.quit.swap(true, Ordering::AcqRel)
    }

    pub fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::Acquire)
    }

    /// Copy of the routine variables.
    pub fn vars(&self) -> RoutineVars {
        *self.vars.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate the routine variables under the lock.
    pub fn with_vars<R>(&self, f: impl FnOnce(&mut RoutineVars) -> R) -> R {
        let mut vars = self.vars.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut vars)
    }

    /// Block until no other cycle is running, then hold the cycle lock.
    pub fn lock_cycle(&self) -> MutexGuard<'_, ()> {
        self.cycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
