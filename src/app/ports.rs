//! Port traits: the boundary between the GPIO core and the arm.
//!
//! ```text
//!   Arm adapter ──▶ StatusPort + IoPort ──▶ GpioPoller
//!               ◀── ArmPort ◀────────────── PickPlaceRoutine
//! ```
//!
//! Adapters are shared between the poll thread and action threads, so
//! every method takes `&self` and implementations must be `Send + Sync`.
//! The arm SDK is assumed safe for concurrent use.

use crate::config::SystemConfig;
use crate::error::{ArmError, ConfigError, IoError};
use crate::gpio::channel::LineValues;
use crate::gpio::controller::ControllerState;

// ───────────────────────────────────────────────────────────────
// Status port
// ───────────────────────────────────────────────────────────────

/// Connectivity and fault status of the arm.
pub trait StatusPort: Send + Sync {
    fn is_connected(&self) -> bool;

    /// Current controller error code; `0` means no error.
    fn error_code(&self) -> i32;
}

// ───────────────────────────────────────────────────────────────
// I/O port (arm → core)
// ───────────────────────────────────────────────────────────────

/// Synchronous I/O reads, one per channel group.
pub trait IoPort: StatusPort {
    /// Tool digital inputs.
    fn read_local_digital(&self) -> Result<LineValues, IoError>;

    /// Tool analog inputs.
    fn read_local_analog(&self) -> Result<LineValues, IoError>;

    /// Packed control-box I/O state.
    fn read_controller_state(&self) -> Result<ControllerState, IoError>;
}

// ───────────────────────────────────────────────────────────────
// Arm port (core → arm)
// ───────────────────────────────────────────────────────────────

/// Blocking motion and output commands.  Each call returns once the move
/// has completed.
pub trait ArmPort: StatusPort {
    /// Joint move, angles in degrees.
    fn set_servo_angle(&self, angles: [f32; 6], speed: f32, acc: f32, radius: f32)
    -> Result<(), ArmError>;

    /// Linear move to `[x, y, z, roll, pitch, yaw]` (mm, degrees).
    fn set_position(&self, pose: [f32; 6], speed: f32, acc: f32, radius: f32)
    -> Result<(), ArmError>;

    /// Drive a control-box digital output.
    fn set_controller_digital(&self, line: u8, high: bool) -> Result<(), ArmError>;

    /// Dwell time the controller inserts between queued moves.
    fn set_pause_time(&self, secs: f32) -> Result<(), ArmError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations validate before persisting and reject invalid ranges
/// with [`ConfigError::ValidationFailed`] rather than clamping.
pub trait ConfigPort {
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}
