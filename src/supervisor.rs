//! Arm supervisor.
//!
//! Turns the controller's status reports into the shared quit flag.  The
//! poll loop and the routine both check that flag, so one fault here
//! winds down every task.
//!
//! ## Quit causes
//!
//! | Report                     | Condition                         | Cause          |
//! |----------------------------|-----------------------------------|----------------|
//! | error/warn changed         | error code != 0                   | `ErrorCode`    |
//! | state changed              | state == 4 on firmware newer 1.1  | `Stopped`      |
//! | connection changed         | not connected                     | `Disconnected` |
//!
//! Each cause is handled at most once, mirroring how the controller SDK
//! callbacks are released after they first fire.

use core::fmt;
use std::sync::Arc;

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::app::shared::SharedState;

/// Controller state code reported once motion has been stopped.
pub const STATE_STOPPED: u8 = 4;

/// Status reports pushed by the arm controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmReport {
    ErrorWarnChanged { error_code: i32, warn_code: i32 },
    StateChanged { state: u8 },
    ConnectChanged { connected: bool, reported: bool },
    CountChanged { count: u32 },
}

/// Why the supervisor raised the quit flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitCause {
    ErrorCode(i32),
    Stopped,
    Disconnected,
}

impl QuitCause {
    const fn mask(self) -> u8 {
        match self {
            Self::ErrorCode(_) => 0b001,
            Self::Stopped => 0b010,
            Self::Disconnected => 0b100,
        }
    }
}

impl fmt::Display for QuitCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ErrorCode(code) => write!(f, "err={code}"),
            Self::Stopped => write!(f, "state={STATE_STOPPED}"),
            Self::Disconnected => write!(f, "disconnect"),
        }
    }
}

/// Controller firmware version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FirmwareVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

impl FirmwareVersion {
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self { major, minor, patch }
    }

    /// State 4 counts as a stop only on firmware newer than 1.1.
    pub const fn reports_stop_state(self) -> bool {
        self.major > 1 || (self.major == 1 && self.minor > 1)
    }
}

pub struct ArmSupervisor {
    shared: Arc<SharedState>,
    firmware: FirmwareVersion,
    /// Causes already handled.
    released: u8,
}

impl ArmSupervisor {
    pub fn new(shared: Arc<SharedState>, firmware: FirmwareVersion) -> Self {
        Self {
            shared,
            firmware,
            released: 0,
        }
    }

    /// Evaluate one report.  Returns the cause if this report raised quit.
    pub fn handle(&mut self, report: ArmReport, sink: &mut impl EventSink) -> Option<QuitCause> {
        let cause = match report {
            ArmReport::ErrorWarnChanged { error_code, warn_code } => {
                if warn_code != 0 {
                    warn!("ARM: warn={}", warn_code);
                }
                (error_code != 0).then_some(QuitCause::ErrorCode(error_code))
            }
            ArmReport::StateChanged { state } => (state == STATE_STOPPED
                && self.firmware.reports_stop_state())
            .then_some(QuitCause::Stopped),
            ArmReport::ConnectChanged { connected, reported } => {
                if !connected {
                    warn!("ARM: disconnect, connected={}, reported={}", connected, reported);
                }
                (!connected).then_some(QuitCause::Disconnected)
            }
            ArmReport::CountChanged { count } => {
                if !self.shared.quit_requested() {
                    info!("ARM: counter val: {}", count);
                    sink.emit(&AppEvent::CounterChanged(count));
                }
                None
            }
        }?;

        if self.released & cause.mask() != 0 {
            return None;
        }
        self.released |= cause.mask();

        self.shared.request_quit();
        error!("ARM: {}, quit", cause);
        sink.emit(&AppEvent::QuitRaised(cause));
        Some(cause)
    }
}
