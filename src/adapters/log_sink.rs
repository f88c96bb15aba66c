//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade.  The demo binary routes that to stderr through
//! `env_logger`.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] as a single line.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::PollerStarted { interval_ms } => {
                info!("POLL | started | interval={}ms", interval_ms);
            }
            AppEvent::ReadFailed { unit, error } => {
                warn!("POLL | read skipped | unit={} | {}", unit, error);
            }
            AppEvent::EdgeFired {
                id,
                kind,
                index,
                previous,
                current,
            } => {
                info!(
                    "GPIO | edge {} | {}[{}] {} -> {}",
                    id, kind, index, previous, current
                );
            }
            AppEvent::PollerStopped(reason) => {
                info!("POLL | stopped | {}", reason);
            }
            AppEvent::QuitRaised(cause) => {
                error!("ARM | quit raised | {}", cause);
            }
            AppEvent::CounterChanged(count) => {
                info!("ROUTINE | counter={}", count);
            }
        }
    }
}
