//! Pick-and-place routine triggered by the GPIO edge.
//!
//! One cycle picks a part from a fixed fixture and places it on a row
//! along X.  After `cycles_per_row` parts the row restarts at
//! `restart_x`.  The waypoints are cell-specific teach points.
//!
//! Before every step the arm's error code and the shared quit flag are
//! checked; a rejected command raises quit so the poller stops as well.

use std::sync::Arc;

use log::{error, info};

use crate::app::ports::ArmPort;
use crate::app::shared::{RoutineVars, SharedState};
use crate::config::{MotionParams, RoutineLayout, SystemConfig};
use crate::error::ArmError;

// ── Teach points (joint angles, degrees) ──────────────────────

const HOME: [f32; 6] = [0.0, -80.0, -10.0, 0.0, 90.0, 0.0];
const PICK_APPROACH: [f32; 6] = [97.6, -16.7, -29.2, 3.0, 47.1, 1.3];
const PICK: [f32; 6] = [97.8, -5.5, -24.3, 3.6, 30.6, 0.6];
const PICK_LIFT: [f32; 6] = [98.1, -30.9, -27.6, 2.7, 57.7, 3.9];
const TRANSFER: [f32; 6] = [3.3, -48.8, -21.9, -0.5, 68.4, 2.6];
const RETREAT: [f32; 6] = [9.2, -28.9, -33.5, 0.0, 62.4, 9.2];

// ── Place poses (mm / degrees); X comes from the row position ─

const PLACE_APPROACH_Y: f32 = 265.0;
const PLACE_APPROACH_Z: f32 = 115.9;
const PLACE_APPROACH_RPY: [f32; 3] = [179.6, -2.3, 0.9];
const PLACE_Y: f32 = 265.6;
const PLACE_RPY: [f32; 3] = [180.0, -2.4, 3.0];

/// A single arm command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionStep {
    /// Drive a control-box output (gripper).
    SetOutput { line: u8, high: bool },
    /// Joint move to angles.
    Joints([f32; 6]),
    /// Linear move to `[x, y, z, roll, pitch, yaw]`.
    Linear([f32; 6]),
}

impl MotionStep {
    pub const fn command(&self) -> &'static str {
        match self {
            Self::SetOutput { .. } => "set_cgpio_digital",
            Self::Joints(_) => "set_servo_angle",
            Self::Linear(_) => "set_position",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// Every step ran; carries the row state after advancing.
    Completed { count: u32, next_x: f32 },
    /// Quit was raised or the arm reported an error before a step.
    Aborted,
    /// A step was rejected; quit has been raised.
    Failed(ArmError),
}

#[derive(Debug, Clone, Copy)]
pub struct PickPlaceRoutine {
    motion: MotionParams,
    layout: RoutineLayout,
}

impl PickPlaceRoutine {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            motion: config.motion,
            layout: config.layout,
        }
    }

    /// Reset the row variables and push the dwell time to the arm.
    pub fn prepare(
        &self,
        arm: &(impl ArmPort + ?Sized),
        shared: &SharedState,
    ) -> Result<(), ArmError> {
        shared.with_vars(|v| {
            *v = RoutineVars {
                x_pos: self.layout.start_x,
                count: 0,
                place_height: self.layout.place_height,
                active: false,
            };
        });
        if arm.error_code() == 0 && !shared.quit_requested() {
            arm.set_pause_time(self.motion.pause_time_secs)?;
        }
        Ok(())
    }

    /// The step list for one cycle at the current row position.
    pub fn steps(&self, vars: &RoutineVars) -> Vec<MotionStep> {
        let gripper = self.layout.gripper_line;
        let [ar, ap, ay] = PLACE_APPROACH_RPY;
        let [pr, pp, py] = PLACE_RPY;
        vec![
            MotionStep::SetOutput { line: gripper, high: false },
            MotionStep::Joints(HOME),
            MotionStep::Joints(PICK_APPROACH),
            MotionStep::Joints(PICK),
            MotionStep::SetOutput { line: gripper, high: true },
            MotionStep::Joints(PICK_LIFT),
            MotionStep::Joints(TRANSFER),
            MotionStep::Linear([vars.x_pos, PLACE_APPROACH_Y, PLACE_APPROACH_Z, ar, ap, ay]),
            MotionStep::Linear([vars.x_pos, PLACE_Y, vars.place_height, pr, pp, py]),
            MotionStep::SetOutput { line: gripper, high: false },
            MotionStep::Joints(RETREAT),
        ]
    }

    /// Run one cycle.  Overlapping triggers queue on the cycle lock.
    pub fn run_cycle(&self, arm: &(impl ArmPort + ?Sized), shared: &SharedState) -> CycleOutcome {
        let _cycle = shared.lock_cycle();
        if shared.quit_requested() {
            return CycleOutcome::Aborted;
        }

        let vars = shared.with_vars(|v| {
            v.active = true;
            *v
        });
        info!("ROUTINE: cycle start at x={:.1} (count={})", vars.x_pos, vars.count);

        let result = self.execute(arm, shared, &self.steps(&vars));

        shared.with_vars(|v| {
            v.active = false;
            match result {
                Ok(()) => {
                    v.count += 1;
                    v.x_pos += self.layout.x_step;
                    if v.count >= self.layout.cycles_per_row {
                        v.x_pos = self.layout.restart_x;
                        v.count = 0;
                    }
                    info!("ROUTINE: cycle done, next x={:.1} (count={})", v.x_pos, v.count);
                    CycleOutcome::Completed {
                        count: v.count,
                        next_x: v.x_pos,
                    }
                }
                Err(Some(e)) => CycleOutcome::Failed(e),
                Err(None) => {
                    info!("ROUTINE: cycle aborted");
                    CycleOutcome::Aborted
                }
            }
        })
    }

    /// Edge action that runs one cycle against `arm`.
    pub fn trigger_action<A>(
        self: Arc<Self>,
        arm: Arc<A>,
        shared: Arc<SharedState>,
    ) -> impl Fn() + Send + Sync + 'static
    where
        A: ArmPort + ?Sized + 'static,
    {
        move || {
            self.run_cycle(arm.as_ref(), &shared);
        }
    }

    // ── Internal ──────────────────────────────────────────────

    /// `Err(None)` = aborted before a step, `Err(Some(e))` = step rejected.
    fn execute(
        &self,
        arm: &(impl ArmPort + ?Sized),
        shared: &SharedState,
        steps: &[MotionStep],
    ) -> Result<(), Option<ArmError>> {
        for step in steps {
            if arm.error_code() != 0 || shared.quit_requested() {
                return Err(None);
            }
            if let Err(e) = self.apply(arm, *step) {
                shared.request_quit();
                error!("ROUTINE: {}, {}", step.command(), e);
                return Err(Some(e));
            }
        }
        Ok(())
    }

    fn apply(&self, arm: &(impl ArmPort + ?Sized), step: MotionStep) -> Result<(), ArmError> {
        let m = &self.motion;
        match step {
            MotionStep::SetOutput { line, high } => arm.set_controller_digital(line, high),
            MotionStep::Joints(angles) => {
                arm.set_servo_angle(angles, m.angle_speed, m.angle_acc, m.joint_radius)
            }
            MotionStep::Linear(pose) => arm.set_position(pose, m.speed, m.acc, m.linear_radius),
        }
    }
}
