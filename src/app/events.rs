//! Outbound events.
//!
//! The poller and the supervisor emit these through the
//! [`EventSink`](super::ports::EventSink) port.

use crate::error::IoError;
use crate::gpio::channel::{ChannelKind, PollUnit};
use crate::gpio::poller::StopReason;
use crate::gpio::registry::RegistrationId;
use crate::supervisor::QuitCause;

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The poll loop entered RUNNING.
    PollerStarted { interval_ms: u64 },

    /// A read failed; the unit is skipped this tick.
    ReadFailed { unit: PollUnit, error: IoError },

    /// A registration saw a transition into its condition.
    EdgeFired {
        id: RegistrationId,
        kind: ChannelKind,
        index: usize,
        previous: f32,
        current: f32,
    },

    /// The poll loop reached STOPPED.
    PollerStopped(StopReason),

    /// The supervisor raised the quit flag.
    QuitRaised(QuitCause),

    /// The controller's operation counter changed.
    CounterChanged(u32),
}
