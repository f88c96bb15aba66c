//! Mock arm adapter for integration tests.
//!
//! Replays queued readings and records every arm command so tests can
//! assert on the full command history without a controller.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use armgpio::app::events::AppEvent;
use armgpio::app::ports::{ArmPort, EventSink, IoPort, StatusPort};
use armgpio::error::{ArmError, IoError};
use armgpio::gpio::channel::line_values;
use armgpio::gpio::{ControllerState, LineValues};

// ── Arm call record ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ArmCall {
    ServoAngle([f32; 6]),
    Position([f32; 6]),
    ControllerDigital { line: u8, high: bool },
    PauseTime(f32),
}

// ── MockArm ───────────────────────────────────────────────────

/// Scripted readings are consumed one per read; once a queue is drained
/// the last pushed reading repeats.
struct MockState {
    connected: bool,
    error_code: i32,
    disconnect_when_drained: bool,
    local_digital: VecDeque<Result<LineValues, IoError>>,
    local_digital_last: LineValues,
    controller: VecDeque<Result<ControllerState, IoError>>,
    controller_last: ControllerState,
    reads: usize,
    calls: Vec<ArmCall>,
    reject: Option<(usize, i32)>,
}

pub struct MockArm {
    state: Mutex<MockState>,
}

#[allow(dead_code)]
impl MockArm {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                connected: true,
                error_code: 0,
                disconnect_when_drained: false,
                local_digital: VecDeque::new(),
                local_digital_last: line_values(&[1.0, 1.0]),
                controller: VecDeque::new(),
                controller_last: ControllerState::general_purpose(0xFFFF, 0),
                reads: 0,
                calls: Vec::new(),
                reject: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn push_local_digital(&self, values: &[f32]) {
        self.lock().local_digital.push_back(Ok(line_values(values)));
    }

    pub fn push_local_failure(&self, error: IoError) {
        self.lock().local_digital.push_back(Err(error));
    }

    pub fn push_controller(&self, state: ControllerState) {
        self.lock().controller.push_back(Ok(state));
    }

    /// Queue a general-purpose controller reading with these input bits.
    pub fn push_controller_inputs(&self, mask: u32) {
        self.push_controller(ControllerState::general_purpose(mask, 0));
    }

    pub fn push_controller_failure(&self, error: IoError) {
        self.lock().controller.push_back(Err(error));
    }

    /// Report disconnected once every queued reading has been consumed.
    pub fn disconnect_when_drained(&self) {
        self.lock().disconnect_when_drained = true;
    }

    pub fn set_connected(&self, connected: bool) {
        self.lock().connected = connected;
    }

    pub fn set_error_code(&self, code: i32) {
        self.lock().error_code = code;
    }

    /// Reject the `n`-th arm command (0-based) with `code`.
    pub fn reject_call(&self, n: usize, code: i32) {
        self.lock().reject = Some((n, code));
    }

    pub fn reads(&self) -> usize {
        self.lock().reads
    }

    pub fn calls(&self) -> Vec<ArmCall> {
        self.lock().calls.clone()
    }

    fn record(&self, call: ArmCall) -> Result<(), ArmError> {
        let mut s = self.lock();
        if !s.connected {
            return Err(ArmError::NotConnected);
        }
        if let Some((n, code)) = s.reject {
            if s.calls.len() == n {
                return Err(ArmError::Code(code));
            }
        }
        s.calls.push(call);
        Ok(())
    }
}

impl StatusPort for MockArm {
    fn is_connected(&self) -> bool {
        let s = self.lock();
        let drained = s.local_digital.is_empty() && s.controller.is_empty();
        s.connected && !(s.disconnect_when_drained && drained)
    }

    fn error_code(&self) -> i32 {
        self.lock().error_code
    }
}

impl IoPort for MockArm {
    fn read_local_digital(&self) -> Result<LineValues, IoError> {
        let mut s = self.lock();
        s.reads += 1;
        match s.local_digital.pop_front() {
            Some(Ok(values)) => {
                s.local_digital_last = values.clone();
                Ok(values)
            }
            Some(Err(e)) => Err(e),
            None => Ok(s.local_digital_last.clone()),
        }
    }

    fn read_local_analog(&self) -> Result<LineValues, IoError> {
        self.lock().reads += 1;
        Ok(line_values(&[0.0, 0.0]))
    }

    fn read_controller_state(&self) -> Result<ControllerState, IoError> {
        let mut s = self.lock();
        s.reads += 1;
        match s.controller.pop_front() {
            Some(Ok(state)) => {
                s.controller_last = state.clone();
                Ok(state)
            }
            Some(Err(e)) => Err(e),
            None => Ok(s.controller_last.clone()),
        }
    }
}

impl ArmPort for MockArm {
    fn set_servo_angle(&self, angles: [f32; 6], _: f32, _: f32, _: f32) -> Result<(), ArmError> {
        self.record(ArmCall::ServoAngle(angles))
    }

    fn set_position(&self, pose: [f32; 6], _: f32, _: f32, _: f32) -> Result<(), ArmError> {
        self.record(ArmCall::Position(pose))
    }

    fn set_controller_digital(&self, line: u8, high: bool) -> Result<(), ArmError> {
        self.record(ArmCall::ControllerDigital { line, high })
    }

    fn set_pause_time(&self, secs: f32) -> Result<(), ArmError> {
        self.record(ArmCall::PauseTime(secs))
    }
}

// ── Event sink ────────────────────────────────────────────────

/// Clonable sink; clones share one event list, so a copy can move into
/// a spawned poller while the test keeps another.
#[derive(Clone, Default)]
pub struct RecordingSink(Arc<Mutex<Vec<AppEvent>>>);

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AppEvent> {
        self.0.lock().unwrap().clone()
    }

    pub fn fired(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, AppEvent::EdgeFired { .. }))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}
