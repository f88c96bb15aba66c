//! System configuration parameters
//!
//! All tunable parameters for the GPIO poller and the pick-and-place
//! routine.  Values can be overridden from a JSON file through
//! [`ConfigPort`](crate::app::ports::ConfigPort).

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::gpio::channel::{ChannelKind, PollUnit};
use crate::gpio::comparator::CompareOp;
use crate::gpio::dispatch::ExecutionMode;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Timing ---
    /// GPIO poll interval (milliseconds)
    pub poll_interval_ms: u32,
    /// Main-thread status check interval (milliseconds)
    pub main_loop_interval_ms: u32,

    // --- Dispatch ---
    /// Whether fired actions block the poll loop or run on their own thread
    pub execution_mode: ExecutionMode,
    /// Units read every tick even without registrations
    pub listen: ListenFlags,

    // --- Routine ---
    /// Input condition that starts one pick-and-place cycle
    pub trigger: TriggerConfig,
    pub motion: MotionParams,
    pub layout: RoutineLayout,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,      // 10 Hz
            main_loop_interval_ms: 500, // 2 Hz
            execution_mode: ExecutionMode::Spawned,
            listen: ListenFlags::default(),
            trigger: TriggerConfig::default(),
            motion: MotionParams::default(),
            layout: RoutineLayout::default(),
        }
    }
}

/// "Always listen" flags: poll a unit even when nothing is registered on
/// it, so its snapshot stays current.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenFlags {
    pub local_digital: bool,
    pub local_analog: bool,
    pub controller: bool,
}

impl ListenFlags {
    pub fn is_listening(&self, unit: PollUnit) -> bool {
        match unit {
            PollUnit::LocalDigital => self.local_digital,
            PollUnit::LocalAnalog => self.local_analog,
            PollUnit::Controller => self.controller,
        }
    }
}

/// Line condition that triggers the routine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    pub kind: ChannelKind,
    pub index: usize,
    pub op: CompareOp,
    pub threshold: f32,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        // Control-box input 7 pulled LOW.
        Self {
            kind: ChannelKind::ControllerDigital,
            index: 7,
            op: CompareOp::Eq,
            threshold: 0.0,
        }
    }
}

/// Speeds, accelerations and blend radii for the routine's moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionParams {
    /// Linear speed (mm/s)
    pub speed: f32,
    /// Linear acceleration (mm/s²)
    pub acc: f32,
    /// Joint speed (°/s)
    pub angle_speed: f32,
    /// Joint acceleration (°/s²)
    pub angle_acc: f32,
    /// Blend radius for joint moves (mm)
    pub joint_radius: f32,
    /// Blend radius for linear moves; negative = stop exactly
    pub linear_radius: f32,
    /// Controller dwell between queued moves (seconds)
    pub pause_time_secs: f32,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            speed: 100.0,
            acc: 2000.0,
            angle_speed: 50.0,
            angle_acc: 500.0,
            joint_radius: 20.0,
            linear_radius: -1.0,
            pause_time_secs: 1.0,
        }
    }
}

/// Where parts are placed: a row along X, restarted after
/// `cycles_per_row` parts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutineLayout {
    /// X of the first place position (mm)
    pub start_x: f32,
    /// X the row restarts from once full (mm)
    pub restart_x: f32,
    /// X advance per placed part (mm)
    pub x_step: f32,
    /// Parts per row
    pub cycles_per_row: u32,
    /// Z of the place position (mm)
    pub place_height: f32,
    /// Control-box output driving the gripper
    pub gripper_line: u8,
}

impl Default for RoutineLayout {
    fn default() -> Self {
        Self {
            start_x: -210.0,
            restart_x: -174.5,
            x_step: 55.0,
            cycles_per_row: 4,
            place_height: -67.7,
            gripper_line: 0,
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("poll_interval_ms must be > 0"));
        }
        if self.main_loop_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("main_loop_interval_ms must be > 0"));
        }
        if self.trigger.index >= self.trigger.kind.width() {
            return Err(ConfigError::ValidationFailed("trigger.index outside channel width"));
        }
        if !self.trigger.threshold.is_finite() {
            return Err(ConfigError::ValidationFailed("trigger.threshold must be finite"));
        }
        let m = &self.motion;
        let positive = [m.speed, m.acc, m.angle_speed, m.angle_acc];
        if positive.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(ConfigError::ValidationFailed("motion speeds must be finite and > 0"));
        }
        if !m.pause_time_secs.is_finite() || m.pause_time_secs < 0.0 {
            return Err(ConfigError::ValidationFailed("motion.pause_time_secs must be >= 0"));
        }
        if self.layout.cycles_per_row == 0 {
            return Err(ConfigError::ValidationFailed("layout.cycles_per_row must be > 0"));
        }
        if usize::from(self.layout.gripper_line) >= crate::gpio::channel::CONTROLLER_DIGITAL_LINES {
            return Err(ConfigError::ValidationFailed("layout.gripper_line outside 0..16"));
        }
        Ok(())
    }
}
