//! # Strafe until target
//!
//! Strafes left or right while holding the robot's target heading until the
//! target detector reports a target close enough to straight ahead, or until
//! a caller supplied stop trigger fires.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info};

use super::{AutoError, RobotCommand, StrafeParams};
use crate::robot::Robot;
use crate::sched::StateMachine;
use crate::sensor::TargetInfo;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const NAME: &str = "CmdStrafeUntilTarget";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Called every tick with the time since the strafe started and the distance
/// moved along x and y. Returning `true` stops the strafe.
pub type StopTrigger = Box<dyn FnMut(f64, f64, f64) -> bool>;

pub struct CmdStrafeUntilTarget {
    sm: StateMachine<StrafeState>,
    params: StrafeParams,

    strafe_right: bool,
    stop_trigger: Option<StopTrigger>,

    start_time_s: f64,
    start_x: f64,
    start_y: f64,

    /// The target which ended the search
    target: Option<TargetInfo>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrafeState {
    StartStrafe,
    CheckForTarget,
    Done,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CmdStrafeUntilTarget {
    /// Create the command, stopped.
    pub fn new(params: &StrafeParams) -> Self {
        Self {
            sm: StateMachine::new(NAME),
            params: *params,
            strafe_right: true,
            stop_trigger: None,
            start_time_s: 0.0,
            start_x: 0.0,
            start_y: 0.0,
            target: None,
        }
    }

    /// Start strafing, stopping only on a target.
    pub fn start(&mut self, robot: &Robot, strafe_right: bool) {
        self.start_inner(robot, strafe_right, None);
    }

    /// Start strafing, stopping on a target or when `trigger` returns true.
    pub fn start_with_trigger(&mut self, robot: &Robot, strafe_right: bool, trigger: StopTrigger) {
        self.start_inner(robot, strafe_right, Some(trigger));
    }

    fn start_inner(&mut self, robot: &Robot, strafe_right: bool, trigger: Option<StopTrigger>) {
        self.strafe_right = strafe_right;
        self.stop_trigger = trigger;
        self.target = None;

        self.start_time_s = robot.elapsed_s();
        self.start_x = robot.drive_base.get_x_position();
        self.start_y = robot.drive_base.get_y_position();

        self.sm.start(StrafeState::StartStrafe);
    }

    /// Time since the strafe started.
    pub fn elapsed_time(&self, robot: &Robot) -> f64 {
        robot.elapsed_s() - self.start_time_s
    }

    /// Distance moved along x and y since the strafe started.
    pub fn distance_moved(&self, robot: &Robot) -> (f64, f64) {
        (
            robot.drive_base.get_x_position() - self.start_x,
            robot.drive_base.get_y_position() - self.start_y,
        )
    }

    /// The target which ended the search, if one did.
    pub fn target(&self) -> Option<TargetInfo> {
        self.target
    }

    /// The current state, `None` once stopped.
    pub fn get_state(&self) -> Option<StrafeState> {
        self.sm.get_state()
    }
}

impl RobotCommand for CmdStrafeUntilTarget {
    fn name(&self) -> &str {
        NAME
    }

    fn cmd_periodic(&mut self, robot: &mut Robot, _elapsed_s: f64) -> Result<bool, AutoError> {
        if !self.sm.is_enabled() {
            return Ok(true);
        }

        let state = self.sm.check_ready_and_get_state();

        let (dx, dy) = self.distance_moved(robot);
        let t = self.elapsed_time(robot);
        let stop = match self.stop_trigger {
            Some(ref mut trigger) => trigger(t, dx, dy),
            None => false,
        };

        if stop {
            info!("{} stopped by trigger after {:.2} s, moved ({:.2}, {:.2})", NAME, t, dx, dy);
            self.cancel(robot);
            return Ok(true);
        }

        let state = match state {
            Some(s) => s,
            None => return Ok(false),
        };

        let mut done = false;

        match state {
            StrafeState::StartStrafe => {
                let x_power = if self.strafe_right {
                    self.params.power
                } else {
                    -self.params.power
                };
                debug!("{} strafing at {:.2}", NAME, x_power);

                robot.pid_drive.drive_maintain_heading(
                    &robot.drive_base,
                    x_power,
                    0.0,
                    robot.target_heading,
                );
                self.sm.set_state(StrafeState::CheckForTarget);
            }
            StrafeState::CheckForTarget => {
                if let Some(target) = robot.target_detector.get_target_info() {
                    if target.angle_deg.abs() <= self.params.angle_tolerance_deg {
                        info!("{} found target {:?} after moving {:.2}", NAME, target, dx);
                        self.target = Some(target);
                        self.sm.set_state(StrafeState::Done);
                    }
                }
            }
            StrafeState::Done => {
                robot.pid_drive.cancel(&mut robot.drive_base);
                self.sm.stop();
                done = true;
            }
        }

        robot.trace_state_info(NAME, &format!("{:?}", state));

        Ok(done)
    }

    fn is_running(&self) -> bool {
        self.sm.is_enabled()
    }

    fn cancel(&mut self, robot: &mut Robot) {
        robot.pid_drive.cancel(&mut robot.drive_base);
        self.sm.stop();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::drive_base::{DriveBaseParams, KinematicsParams};
    use crate::pid::PidParams;
    use crate::pid_drive::PidDriveParams;
    use crate::sim::{SimRig, SimRigParams};
    use crate::trace::LogTraceSink;

    const DT: f64 = 0.02;

    fn rig() -> (SimRig, Robot) {
        let rig = SimRig::new(&SimRigParams::default());
        let mut robot = rig
            .robot(
                &DriveBaseParams::new(KinematicsParams::Mecanum),
                &PidParams::p_only(0.02, 0.5),
                &PidDriveParams {
                    turn: Some(PidParams::heading(0.02, 1.0)),
                    ..Default::default()
                },
                Box::new(LogTraceSink),
            )
            .unwrap();
        robot.start_mode();
        (rig, robot)
    }

    /// Run one full tick, returns the command's result.
    fn tick(rig: &SimRig, robot: &mut Robot, cmd: &mut CmdStrafeUntilTarget, n: usize) -> bool {
        let elapsed = n as f64 * DT;
        rig.step(DT);
        robot.pre_periodic(elapsed);
        let done = cmd.cmd_periodic(robot, elapsed).unwrap();
        robot.post_periodic().unwrap();
        done
    }

    #[test]
    fn test_strafe_until_target() {
        let (rig, mut robot) = rig();
        let mut cmd = CmdStrafeUntilTarget::new(&StrafeParams::default());
        cmd.start(&robot, true);

        let mut n = 0;
        for _ in 0..25 {
            n += 1;
            assert!(!tick(&rig, &mut robot, &mut cmd, n));
        }
        assert!(robot.pid_drive.is_active());
        assert_eq!(
            cmd.get_state(),
            Some(crate::auto::StrafeState::CheckForTarget)
        );

        // A target off to the side does not stop the search
        rig.detector.set_target(Some(TargetInfo {
            angle_deg: 20.0,
            lateral_offset: 5.0,
            forward_offset: 30.0,
        }));
        for _ in 0..5 {
            n += 1;
            assert!(!tick(&rig, &mut robot, &mut cmd, n));
        }

        rig.detector.set_target(Some(TargetInfo {
            angle_deg: -3.0,
            lateral_offset: -1.0,
            forward_offset: 30.0,
        }));
        let mut done = false;
        for _ in 0..3 {
            n += 1;
            if tick(&rig, &mut robot, &mut cmd, n) {
                done = true;
                break;
            }
        }

        assert!(done);
        assert!(!cmd.is_running());
        assert_eq!(cmd.get_state(), None);
        assert_eq!(cmd.target().map(|t| t.angle_deg), Some(-3.0));
        assert!(!robot.pid_drive.is_active());
        assert_eq!(robot.drive_base.wheel_powers(), [0.0; 4]);

        let (dx, dy) = cmd.distance_moved(&robot);
        assert!(dx > 10.0);
        assert!(dy.abs() < 1e-9);
        assert!(rig.detector.num_reads() >= 6);
    }

    #[test]
    fn test_stop_trigger() {
        let (rig, mut robot) = rig();
        let mut cmd = CmdStrafeUntilTarget::new(&StrafeParams::default());
        cmd.start_with_trigger(&robot, false, Box::new(|_t, dx, _dy| dx <= -20.0));

        let mut n = 0;
        while n < 200 {
            n += 1;
            if tick(&rig, &mut robot, &mut cmd, n) {
                break;
            }
        }

        let (dx, _) = cmd.distance_moved(&robot);
        assert!(dx <= -20.0 && dx > -22.0, "dx = {}", dx);
        assert!(cmd.target().is_none());
        assert!(!cmd.is_running());
        assert!(!robot.pid_drive.is_active());
        assert!(cmd.elapsed_time(&robot) > 0.0);
    }
}
