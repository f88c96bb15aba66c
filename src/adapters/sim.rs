//! Simulated arm controller.
//!
//! Stands in for the arm SDK on the host.  Control-box digital input 7
//! idles HIGH and is pulled LOW for a few reads at a fixed read period,
//! `presses` times; after the last press the controller disconnects.
//! Moves sleep for `move_delay` and are counted.
//!
//! Status reports go to the `reporter` callback, always invoked after the
//! internal lock has been released.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use log::debug;

use crate::app::ports::{ArmPort, IoPort, StatusPort};
use crate::error::{ArmError, IoError};
use crate::gpio::channel::{LOCAL_ANALOG_LINES, LOCAL_DIGITAL_LINES, LineValues, line_values};
use crate::gpio::controller::ControllerState;
use crate::supervisor::{ArmReport, FirmwareVersion};

/// Input line the simulated operator presses.
pub const BUTTON_LINE: u8 = 7;

/// What the simulated operator does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimScript {
    /// Number of button presses before disconnecting.
    pub presses: u32,
    /// Controller reads between press starts.
    pub press_period_reads: u32,
    /// Controller reads the line stays LOW per press.
    pub press_width_reads: u32,
    /// Time each move command takes.
    pub move_delay: Duration,
    pub firmware: FirmwareVersion,
}

impl Default for SimScript {
    fn default() -> Self {
        Self {
            presses: 3,
            press_period_reads: 10,
            press_width_reads: 2,
            move_delay: Duration::from_millis(50),
            firmware: FirmwareVersion::new(1, 8, 3),
        }
    }
}

type Reporter = Box<dyn Fn(ArmReport) + Send + Sync>;

#[derive(Debug)]
struct SimInner {
    connected: bool,
    error_code: i32,
    controller_reads: u32,
    presses_done: u32,
    low_remaining: u32,
    outputs: u32,
    read_failure: Option<IoError>,
    moves: u32,
    counter: u32,
}

pub struct SimulatedArm {
    script: SimScript,
    inner: Mutex<SimInner>,
    reporter: Reporter,
}

impl SimulatedArm {
    pub fn new(script: SimScript, reporter: impl Fn(ArmReport) + Send + Sync + 'static) -> Self {
        Self {
            script,
            inner: Mutex::new(SimInner {
                connected: true,
                error_code: 0,
                controller_reads: 0,
                presses_done: 0,
                low_remaining: 0,
                outputs: 0,
                read_failure: None,
                moves: 0,
                counter: 0,
            }),
            reporter: Box::new(reporter),
        }
    }

    pub fn firmware(&self) -> FirmwareVersion {
        self.script.firmware
    }

    /// Move commands accepted so far.
    pub fn move_count(&self) -> u32 {
        self.lock().moves
    }

    /// Button presses started so far.
    pub fn presses_done(&self) -> u32 {
        self.lock().presses_done
    }

    pub fn output(&self, line: u8) -> bool {
        self.lock().outputs & (1 << line) != 0
    }

    /// Put the controller into an error state.
    pub fn inject_error(&self, code: i32) {
        self.lock().error_code = code;
        (self.reporter)(ArmReport::ErrorWarnChanged {
            error_code: code,
            warn_code: 0,
        });
    }

    /// Make every read fail with `error` until cleared with `None`.
    pub fn set_read_failure(&self, error: Option<IoError>) {
        self.lock().read_failure = error;
    }

    pub fn disconnect(&self) {
        let was_connected = std::mem::replace(&mut self.lock().connected, false);
        if was_connected {
            (self.reporter)(ArmReport::ConnectChanged {
                connected: false,
                reported: true,
            });
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_read(inner: &SimInner) -> Result<(), IoError> {
        if !inner.connected {
            return Err(IoError::Timeout);
        }
        match inner.read_failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Advance the operator script by one controller read.  Returns
    /// `true` once the script is finished and the arm should disconnect.
    fn step_script(&self, inner: &mut SimInner) -> bool {
        let s = &self.script;
        inner.controller_reads += 1;
        if inner.low_remaining > 0 {
            inner.low_remaining -= 1;
            return false;
        }
        if inner.controller_reads % s.press_period_reads.max(1) != 0 {
            return false;
        }
        if inner.presses_done < s.presses {
            inner.presses_done += 1;
            inner.low_remaining = s.press_width_reads.max(1);
            debug!("SIM: button press {}/{}", inner.presses_done, s.presses);
            return false;
        }
        true
    }

    fn command(
        &self,
        apply: impl FnOnce(&mut SimInner) -> Option<ArmReport>,
    ) -> Result<(), ArmError> {
        let report = {
            let mut inner = self.lock();
            if !inner.connected {
                return Err(ArmError::NotConnected);
            }
            if inner.error_code != 0 {
                return Err(ArmError::Code(inner.error_code));
            }
            apply(&mut *inner)
        };
        if let Some(report) = report {
            (self.reporter)(report);
        }
        Ok(())
    }

    fn motion(&self) -> Result<(), ArmError> {
        self.command(|inner| {
            inner.moves += 1;
            None
        })?;
        thread::sleep(self.script.move_delay);
        Ok(())
    }
}

impl StatusPort for SimulatedArm {
    fn is_connected(&self) -> bool {
        self.lock().connected
    }

    fn error_code(&self) -> i32 {
        self.lock().error_code
    }
}

impl IoPort for SimulatedArm {
    fn read_local_digital(&self) -> Result<LineValues, IoError> {
        Self::check_read(&self.lock())?;
        Ok(line_values(&[0.0; LOCAL_DIGITAL_LINES]))
    }

    fn read_local_analog(&self) -> Result<LineValues, IoError> {
        Self::check_read(&self.lock())?;
        Ok(line_values(&[0.0; LOCAL_ANALOG_LINES]))
    }

    fn read_controller_state(&self) -> Result<ControllerState, IoError> {
        let (result, finished) = {
            let mut inner = self.lock();
            Self::check_read(&inner)?;
            let finished = self.step_script(&mut *inner);
            let mut inputs: u32 = 0xFFFF;
            if inner.low_remaining > 0 {
                inputs &= !(1 << BUTTON_LINE);
            }
            (ControllerState::general_purpose(inputs, inner.outputs), finished)
        };
        if finished {
            self.disconnect();
        }
        Ok(result)
    }
}

impl ArmPort for SimulatedArm {
    fn set_servo_angle(&self, angles: [f32; 6], _speed: f32, _acc: f32, _radius: f32)
    -> Result<(), ArmError> {
        debug!("SIM: set_servo_angle {:?}", angles);
        self.motion()
    }

    fn set_position(&self, pose: [f32; 6], _speed: f32, _acc: f32, _radius: f32)
    -> Result<(), ArmError> {
        debug!("SIM: set_position {:?}", pose);
        self.motion()
    }

    fn set_controller_digital(&self, line: u8, high: bool) -> Result<(), ArmError> {
        if line >= 16 {
            return Err(ArmError::Code(-1));
        }
        self.command(|inner| {
            let bit = 1 << line;
            let was_high = inner.outputs & bit != 0;
            if high {
                inner.outputs |= bit;
                None
            } else {
                inner.outputs &= !bit;
                // A released gripper counts one placed part.
                was_high.then(|| {
                    inner.counter += 1;
                    ArmReport::CountChanged { count: inner.counter }
                })
            }
        })
    }

    fn set_pause_time(&self, secs: f32) -> Result<(), ArmError> {
        debug!("SIM: set_pause_time {}", secs);
        self.command(|_| None)
    }
}
