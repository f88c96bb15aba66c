//! Action dispatch: run a fired action inline or on its own thread.

use std::sync::Arc;

use log::warn;
use serde::{Deserialize, Serialize};

use super::registry::Registration;
use crate::error::Result;
use crate::task::{ACTION_STACK_KB, spawn_task};

/// How fired actions are executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    /// Call the action on the poll thread.  The poll cadence stalls for
    /// the action's full duration.
    Inline,
    /// Run each firing on a freshly spawned thread.
    #[default]
    Spawned,
}

#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    mode: ExecutionMode,
}

impl Dispatcher {
    pub fn new(mode: ExecutionMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Execute the registration's action according to the mode.
    ///
    /// Spawned actions are detached; the poll loop never waits on them.
    pub fn dispatch(&self, registration: &Registration) -> Result<()> {
        match self.mode {
            ExecutionMode::Inline => {
                (registration.action)();
                Ok(())
            }
            ExecutionMode::Spawned => {
                let action = Arc::clone(&registration.action);
                spawn_task("gpio-action", ACTION_STACK_KB, move || action())
                    .map(drop)
                    .inspect_err(|e| {
                        warn!("GPIO: {} action not dispatched: {}", registration.id, e);
                    })
            }
        }
    }
}
