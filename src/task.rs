//! Named worker-thread spawning.
//!
//! Every task in the crate (the GPIO poll loop, spawned edge actions) is
//! started through [`spawn_task`] with a thread name and an explicit
//! stack size.

use std::thread::{Builder, JoinHandle};

use log::{debug, error};

use crate::error::{Error, Result};

/// Stack size for the GPIO poll loop.
pub const POLLER_STACK_KB: usize = 64;
/// Stack size for a spawned edge action.
pub const ACTION_STACK_KB: usize = 256;

/// Spawn a named thread with an explicit stack size.
///
/// Thread creation failure is reported as [`Error::Spawn`].
pub fn spawn_task<T, F>(name: &'static str, stack_kb: usize, f: F) -> Result<JoinHandle<T>>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    debug!("Spawning '{}' (stack={}KB)", name, stack_kb);

    Builder::new()
        .name(name.into())
        .stack_size(stack_kb * 1024)
        .spawn(f)
        .map_err(|e| {
            error!("Spawning '{}' failed: {}", name, e);
            Error::Spawn(name)
        })
}
