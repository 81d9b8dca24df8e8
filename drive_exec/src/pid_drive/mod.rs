//! # PID drive
//!
//! Coordinates up to three position loops (X, Y and heading) on a drive
//! base. Each tick the loops are fed the odometry pose and their outputs are
//! combined into a single drive command. A move completes when every present
//! axis is on target, or fails when the robot stalls, and in both cases the
//! move's event is signaled.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info, warn};
use serde::Serialize;

use crate::drive_base::{DriveBase, DriveBaseError};
use crate::pid::{PidController, PidParams};
use crate::sched::Event;
use crate::trace::PidTrace;

pub use params::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The PID drive coordinator.
#[derive(Debug)]
pub struct PidDrive {
    name: String,

    x_pid: Option<PidController>,
    y_pid: Option<PidController>,
    turn_pid: Option<PidController>,

    stall_timeout_s: f64,
    stall_threshold: f64,

    /// The running request, `None` when idle
    mode: Option<DriveMode>,

    /// Result of the last completed move
    outcome: Option<Outcome>,

    /// Time at which the output first fell below the stall threshold
    stall_start_s: Option<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How a move finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// Every controlled axis reached its target
    OnTarget,

    /// The output stayed too low for too long without reaching the target
    Stalled,
}

#[derive(Debug)]
enum DriveMode {
    /// Drive to a target
    Target {
        hold: bool,
        event: Option<Event>,
        signaled: bool,
    },

    /// Drive at fixed translation powers while holding the heading
    MaintainHeading { x_power: f64, y_power: f64 },
}

/// Possible errors from the PID drive.
#[derive(Debug, thiserror::Error)]
pub enum PidDriveError {
    #[error("A target was requested but no axis is controlled")]
    NoAxes,

    #[error("A lateral move of {0} was requested on a non-holonomic drive base")]
    LateralOnNonHolonomic(f64),

    #[error("Drive base error: {0}")]
    DriveBase(#[from] DriveBaseError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidDrive {
    pub fn new(name: &str, params: &PidDriveParams) -> Self {
        let pid = |axis: &str, p: &Option<PidParams>| {
            p.map(|p| PidController::new(&format!("{}.{}", name, axis), p))
        };

        Self {
            name: name.to_string(),
            x_pid: pid("x", &params.x),
            y_pid: pid("y", &params.y),
            turn_pid: pid("turn", &params.turn),
            stall_timeout_s: params.stall_timeout_s,
            stall_threshold: params.stall_threshold,
            mode: None,
            outcome: None,
            stall_start_s: None,
        }
    }

    pub fn x_pid_mut(&mut self) -> Option<&mut PidController> {
        self.x_pid.as_mut()
    }

    pub fn y_pid_mut(&mut self) -> Option<&mut PidController> {
        self.y_pid.as_mut()
    }

    pub fn turn_pid_mut(&mut self) -> Option<&mut PidController> {
        self.turn_pid.as_mut()
    }

    /// Start a move of `(x, y)` relative to the current position towards
    /// `heading_deg`.
    ///
    /// Targets for axes which are not controlled are ignored. If `hold` is
    /// set the loops keep running after the target is reached, the event is
    /// still signaled once. The event is cleared when the move starts.
    pub fn set_target(
        &mut self,
        base: &DriveBase,
        x: f64,
        y: f64,
        heading_deg: f64,
        hold: bool,
        event: Option<&Event>,
    ) -> Result<(), PidDriveError> {
        if self.x_pid.is_none() && self.y_pid.is_none() && self.turn_pid.is_none() {
            return Err(PidDriveError::NoAxes);
        }
        if x != 0.0 && self.x_pid.is_some() && !base.supports_holonomic() {
            return Err(PidDriveError::LateralOnNonHolonomic(x));
        }

        if let Some(e) = event {
            e.clear();
        }

        let pose = base.get_pose();
        match self.x_pid {
            Some(ref mut p) => p.set_target(x, pose.x),
            None if x != 0.0 => warn!("[{}] X target {} ignored, no X control", self.name, x),
            None => (),
        }
        match self.y_pid {
            Some(ref mut p) => p.set_target(y, pose.y),
            None if y != 0.0 => warn!("[{}] Y target {} ignored, no Y control", self.name, y),
            None => (),
        }
        if let Some(ref mut p) = self.turn_pid {
            p.set_target(heading_deg, pose.heading_deg);
        }

        info!(
            "[{}] Target x = {:.2}, y = {:.2}, heading = {:.1} (hold: {})",
            self.name, x, y, heading_deg, hold
        );

        self.mode = Some(DriveMode::Target {
            hold,
            event: event.cloned(),
            signaled: false,
        });
        self.outcome = None;
        self.stall_start_s = None;

        Ok(())
    }

    /// Drive at fixed translation powers while the heading loop holds
    /// `heading_deg`. Runs until cancelled.
    pub fn drive_maintain_heading(
        &mut self,
        base: &DriveBase,
        x_power: f64,
        y_power: f64,
        heading_deg: f64,
    ) {
        if let Some(ref mut p) = self.turn_pid {
            p.set_target(heading_deg, base.get_heading());
        }

        debug!(
            "[{}] Maintain heading {:.1} at ({:.2}, {:.2})",
            self.name, heading_deg, x_power, y_power
        );

        self.mode = Some(DriveMode::MaintainHeading { x_power, y_power });
        self.outcome = None;
        self.stall_start_s = None;
    }

    /// Stop the current move and the drive base.
    ///
    /// The move's event is not signaled.
    pub fn cancel(&mut self, base: &mut DriveBase) {
        if self.mode.take().is_some() {
            info!("[{}] Canceled", self.name);
        }
        self.stall_start_s = None;
        base.stop();
    }

    /// True while a move or heading hold is running.
    pub fn is_active(&self) -> bool {
        self.mode.is_some()
    }

    /// How the last move finished, `None` while running or after a cancel.
    pub fn get_outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Change stall detection. A zero timeout disables it.
    pub fn set_stall_timeout(&mut self, timeout_s: f64, threshold: f64) {
        self.stall_timeout_s = timeout_s;
        self.stall_threshold = threshold;
    }

    /// Run the loops for one tick. Must be called after odometry has been
    /// updated.
    pub fn update(
        &mut self,
        base: &mut DriveBase,
        elapsed_s: f64,
        dt: f64,
    ) -> Result<(), PidDriveError> {
        let mut mode = match self.mode.take() {
            Some(m) => m,
            None => return Ok(()),
        };

        let pose = base.get_pose();
        let compute = |pid: &mut Option<PidController>, input: f64| match pid {
            Some(p) => p.compute(input, dt),
            None => 0.0,
        };
        let x_out = compute(&mut self.x_pid, pose.x);
        let y_out = compute(&mut self.y_pid, pose.y);
        let turn_out = compute(&mut self.turn_pid, pose.heading_deg);

        match mode {
            DriveMode::MaintainHeading { x_power, y_power } => {
                self.drive(base, x_power, y_power, turn_out)?;
            }
            DriveMode::Target {
                hold,
                ref event,
                ref mut signaled,
            } => {
                let on_target = self.x_pid.as_ref().map_or(true, |p| p.is_on_target())
                    && self.y_pid.as_ref().map_or(true, |p| p.is_on_target())
                    && self.turn_pid.as_ref().map_or(true, |p| p.is_on_target());

                let stalled = !on_target && self.check_stall(elapsed_s, &[x_out, y_out, turn_out]);

                if on_target || stalled {
                    let outcome = if on_target {
                        Outcome::OnTarget
                    } else {
                        Outcome::Stalled
                    };

                    if !*signaled {
                        match outcome {
                            Outcome::OnTarget => {
                                info!("[{}] On target at {:.3} s", self.name, elapsed_s)
                            }
                            Outcome::Stalled => warn!(
                                "[{}] Stalled at {:.3} s, pose = {:?}",
                                self.name, elapsed_s, pose
                            ),
                        }

                        if let Some(e) = event {
                            e.signal();
                        }
                        *signaled = true;
                    }
                    self.outcome = Some(outcome);

                    if stalled || !hold {
                        base.stop();
                        self.stall_start_s = None;
                        return Ok(());
                    }
                }

                self.drive(base, x_out, y_out, turn_out)?;
            }
        }

        self.mode = Some(mode);
        Ok(())
    }

    /// Trace records of every controlled axis.
    pub fn axis_traces(&self, elapsed_s: f64) -> Vec<PidTrace> {
        [("x", &self.x_pid), ("y", &self.y_pid), ("turn", &self.turn_pid)]
            .iter()
            .filter_map(|&(axis, pid)| {
                pid.as_ref().map(|p| PidTrace {
                    elapsed_s,
                    axis: format!("{}.{}", self.name, axis),
                    target: p.get_target(),
                    input: p.get_input(),
                    error: p.get_error(),
                    output: p.get_output(),
                    on_target: p.is_on_target(),
                })
            })
            .collect()
    }

    fn check_stall(&mut self, elapsed_s: f64, outputs: &[f64]) -> bool {
        if self.stall_timeout_s <= 0.0 {
            return false;
        }

        let magnitude = util::maths::max_abs(outputs);
        if magnitude >= self.stall_threshold {
            self.stall_start_s = None;
            return false;
        }

        let start = *self.stall_start_s.get_or_insert(elapsed_s);
        elapsed_s - start >= self.stall_timeout_s
    }

    fn drive(
        &self,
        base: &mut DriveBase,
        x: f64,
        y: f64,
        turn: f64,
    ) -> Result<(), PidDriveError> {
        if base.supports_holonomic() {
            base.holonomic_drive(x, y, turn, false, None)?;
        } else {
            base.arcade_drive(y, turn, false);
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::drive_base::{DriveBaseParams, KinematicsParams, NUM_WHEELS};
    use crate::pid::PidParams;
    use crate::sim::{SimRig, SimRigParams};

    const DT: f64 = 0.02;

    fn rig(kinematics: KinematicsParams) -> (SimRig, DriveBase) {
        let rig = SimRig::new(&SimRigParams::default());
        let base = rig
            .drive_base(&DriveBaseParams::new(kinematics), &PidParams::p_only(0.02, 0.5))
            .unwrap();
        (rig, base)
    }

    /// Run ticks until the drive is idle, returning the number of ticks.
    fn run(rig: &SimRig, base: &mut DriveBase, drive: &mut PidDrive, max_ticks: usize) -> usize {
        for tick in 1..=max_ticks {
            let t = tick as f64 * DT;
            rig.step(DT);
            base.update_odometry(t);
            base.update_steering(DT);
            drive.update(base, t, DT).unwrap();

            if !drive.is_active() {
                return tick;
            }
        }
        max_ticks
    }

    #[test]
    fn test_heading_only_converges() {
        let (rig, mut base) = rig(KinematicsParams::Mecanum);
        let mut drive = PidDrive::new(
            "drive",
            &PidDriveParams {
                turn: Some(PidParams::heading(0.02, 1.0)),
                ..Default::default()
            },
        );
        let event = Event::new("turn");

        drive
            .set_target(&base, 0.0, 0.0, 90.0, false, Some(&event))
            .unwrap();
        assert!(drive.is_active());

        let ticks = run(&rig, &mut base, &mut drive, 1000);
        assert!(ticks < 1000);
        assert!(event.is_signaled());
        assert_eq!(drive.get_outcome(), Some(Outcome::OnTarget));
        assert!((base.get_heading() - 90.0).abs() <= 1.0);
        assert_eq!(base.wheel_powers(), [0.0; NUM_WHEELS]);
    }

    #[test]
    fn test_xy_move_on_mecanum() {
        let (rig, mut base) = rig(KinematicsParams::Mecanum);
        let mut drive = PidDrive::new(
            "drive",
            &PidDriveParams {
                x: Some(PidParams::p_only(0.05, 0.5)),
                y: Some(PidParams::p_only(0.05, 0.5)),
                turn: Some(PidParams::heading(0.02, 1.0)),
                ..Default::default()
            },
        );
        let event = Event::new("move");

        drive
            .set_target(&base, 12.0, 24.0, 0.0, false, Some(&event))
            .unwrap();
        run(&rig, &mut base, &mut drive, 2000);

        assert!(event.is_signaled());
        assert!((base.get_x_position() - 12.0).abs() <= 0.5);
        assert!((base.get_y_position() - 24.0).abs() <= 0.5);
    }

    #[test]
    fn test_cancel_mid_move() {
        let (rig, mut base) = rig(KinematicsParams::Mecanum);
        let mut drive = PidDrive::new(
            "drive",
            &PidDriveParams {
                y: Some(PidParams::p_only(0.05, 0.5)),
                ..Default::default()
            },
        );
        let event = Event::new("move");

        drive
            .set_target(&base, 0.0, 100.0, 0.0, false, Some(&event))
            .unwrap();
        run(&rig, &mut base, &mut drive, 10);
        assert!(base.wheel_powers().iter().all(|p| *p != 0.0));

        drive.cancel(&mut base);
        assert!(!drive.is_active());
        assert!(!event.is_signaled());
        assert_eq!(drive.get_outcome(), None);

        // Idle updates leave the base stopped
        rig.step(DT);
        base.update_odometry(1.0);
        drive.update(&mut base, 1.0, DT).unwrap();
        assert_eq!(base.wheel_powers(), [0.0; NUM_WHEELS]);
        assert!(!event.is_signaled());
    }

    #[test]
    fn test_stall_is_reported() {
        let (rig, mut base) = rig(KinematicsParams::Mecanum);
        let mut drive = PidDrive::new(
            "drive",
            &PidDriveParams {
                y: Some(PidParams::p_only(0.001, 0.5)),
                stall_timeout_s: 0.5,
                stall_threshold: 0.05,
                ..Default::default()
            },
        );
        let event = Event::new("move");

        drive
            .set_target(&base, 0.0, 10.0, 0.0, false, Some(&event))
            .unwrap();
        let ticks = run(&rig, &mut base, &mut drive, 1000);

        assert!(ticks >= 25 && ticks < 100, "stalled after {} ticks", ticks);
        assert!(event.is_signaled());
        assert_eq!(drive.get_outcome(), Some(Outcome::Stalled));
        assert_eq!(base.wheel_powers(), [0.0; NUM_WHEELS]);
    }

    #[test]
    fn test_hold_target_keeps_running() {
        let (rig, mut base) = rig(KinematicsParams::Mecanum);
        let mut drive = PidDrive::new(
            "drive",
            &PidDriveParams {
                y: Some(PidParams::p_only(0.05, 0.5)),
                ..Default::default()
            },
        );
        let event = Event::new("move");

        drive
            .set_target(&base, 0.0, 10.0, 0.0, true, Some(&event))
            .unwrap();
        run(&rig, &mut base, &mut drive, 500);

        assert!(event.is_signaled());
        assert!(drive.is_active());
        assert_eq!(drive.get_outcome(), Some(Outcome::OnTarget));
    }

    #[test]
    fn test_tank_uses_arcade() {
        let (rig, mut base) = rig(KinematicsParams::Tank);
        let mut drive = PidDrive::new(
            "drive",
            &PidDriveParams {
                x: Some(PidParams::p_only(0.05, 0.5)),
                y: Some(PidParams::p_only(0.05, 0.5)),
                turn: Some(PidParams::heading(0.02, 1.0)),
                ..Default::default()
            },
        );

        assert!(matches!(
            drive.set_target(&base, 5.0, 0.0, 0.0, false, None),
            Err(PidDriveError::LateralOnNonHolonomic(_))
        ));

        drive.set_target(&base, 0.0, 20.0, 0.0, false, None).unwrap();
        run(&rig, &mut base, &mut drive, 1000);
        assert!((base.get_y_position() - 20.0).abs() <= 0.5);
    }

    #[test]
    fn test_maintain_heading_drives_until_canceled() {
        let (rig, mut base) = rig(KinematicsParams::Mecanum);
        let mut drive = PidDrive::new(
            "drive",
            &PidDriveParams {
                turn: Some(PidParams::heading(0.02, 1.0)),
                ..Default::default()
            },
        );

        drive.drive_maintain_heading(&base, 0.5, 0.0, 0.0);
        let ticks = run(&rig, &mut base, &mut drive, 50);
        assert_eq!(ticks, 50);
        assert!(base.get_x_position() > 40.0);
        assert!(base.get_heading().abs() < 1.0);

        drive.cancel(&mut base);
        assert!(!drive.is_active());
    }

    #[test]
    fn test_no_axes_is_an_error() {
        let (_, base) = rig(KinematicsParams::Mecanum);
        let mut drive = PidDrive::new("drive", &PidDriveParams::default());

        assert!(matches!(
            drive.set_target(&base, 0.0, 1.0, 0.0, false, None),
            Err(PidDriveError::NoAxes)
        ));
    }
}
