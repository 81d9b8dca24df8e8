//! # Robot
//!
//! Owns every subsystem the autonomous commands drive and runs one control
//! tick in a fixed order. The tick is split around the active command:
//!
//! - [`Robot::pre_periodic`]: task context clock and timers, odometry,
//!   swerve steering loops.
//! - the command's `cmd_periodic`.
//! - [`Robot::post_periodic`]: PID drive, mechanisms, trace output.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info};

use crate::drive_base::{DriveBase, DriveBaseError};
use crate::mechanism::{Elevator, Grabber};
use crate::pid_drive::{PidDrive, PidDriveError};
use crate::sched::TaskContext;
use crate::sensor::TargetDetector;
use crate::trace::{StateTrace, TraceSink};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The robot and its subsystems.
pub struct Robot {
    /// Scheduling context of the current mode
    pub ctx: TaskContext,

    pub drive_base: DriveBase,

    pub pid_drive: PidDrive,

    pub elevator: Box<dyn Elevator>,

    pub grabber: Box<dyn Grabber>,

    pub target_detector: Box<dyn TargetDetector>,

    pub trace: Box<dyn TraceSink>,

    /// Heading held by autonomous moves, in degrees
    pub target_heading: f64,

    /// Set while an autonomous command owns the drive base
    autonomous_active: bool,

    /// Mode time of the current tick
    elapsed_s: f64,

    /// Period of the current tick
    dt: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors from the robot.
#[derive(Debug, thiserror::Error)]
pub enum RobotError {
    #[error("Manual drive commands are refused while an autonomous command is active")]
    AutonomousActive,

    #[error("Drive base error: {0}")]
    DriveBase(#[from] DriveBaseError),

    #[error("PID drive error: {0}")]
    PidDrive(#[from] PidDriveError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Robot {
    pub fn new(
        ctx: TaskContext,
        drive_base: DriveBase,
        pid_drive: PidDrive,
        elevator: Box<dyn Elevator>,
        grabber: Box<dyn Grabber>,
        target_detector: Box<dyn TargetDetector>,
        trace: Box<dyn TraceSink>,
    ) -> Self {
        Self {
            ctx,
            drive_base,
            pid_drive,
            elevator,
            grabber,
            target_detector,
            trace,
            target_heading: 0.0,
            autonomous_active: false,
            elapsed_s: 0.0,
            dt: 0.0,
        }
    }

    // ---- MODE LIFECYCLE ----

    /// Prepare for a new mode: restart the clock, zero the pose and the held
    /// heading.
    pub fn start_mode(&mut self) {
        self.ctx.reset();
        self.drive_base.reset_odometry();
        self.target_heading = 0.0;
        self.elapsed_s = 0.0;
        self.dt = 0.0;

        info!("Mode started");
    }

    /// Stop every subsystem.
    pub fn stop_mode(&mut self) {
        self.pid_drive.cancel(&mut self.drive_base);
        self.drive_base.stop();
        self.elevator.stop();
        self.grabber.stop();
        self.autonomous_active = false;

        info!("Mode stopped at {:.3} s", self.elapsed_s);
    }

    pub fn is_autonomous_active(&self) -> bool {
        self.autonomous_active
    }

    pub(crate) fn set_autonomous_active(&mut self, active: bool) {
        debug!("Autonomous active: {}", active);
        self.autonomous_active = active;
    }

    // ---- TICK ----

    /// First half of the tick, run before the active command.
    pub fn pre_periodic(&mut self, elapsed_s: f64) {
        self.dt = (elapsed_s - self.elapsed_s).max(0.0);
        self.elapsed_s = elapsed_s;

        self.ctx.tick(elapsed_s);
        self.drive_base.update_odometry(elapsed_s);
        self.drive_base.update_steering(self.dt);
    }

    /// Second half of the tick, run after the active command.
    ///
    /// Mechanisms are updated even if the PID drive fails.
    pub fn post_periodic(&mut self) -> Result<(), RobotError> {
        let drive_result = self
            .pid_drive
            .update(&mut self.drive_base, self.elapsed_s, self.dt);

        self.elevator.update(self.dt);
        self.grabber.update(self.dt);

        if self.pid_drive.is_active() {
            for t in self.pid_drive.axis_traces(self.elapsed_s).iter() {
                self.trace.pid_info(t);
            }
        }

        Ok(drive_result?)
    }

    /// Mode time of the current tick.
    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_s
    }

    /// Period of the current tick.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    // ---- MANUAL CONTROL ----

    /// Drive from operator input.
    ///
    /// Refused while an autonomous command owns the drive base.
    pub fn manual_drive(&mut self, x: f64, y: f64, rot: f64) -> Result<(), RobotError> {
        if self.autonomous_active {
            return Err(RobotError::AutonomousActive);
        }

        if self.drive_base.supports_holonomic() {
            self.drive_base.holonomic_drive(x, y, rot, false, None)?;
        } else {
            self.drive_base.arcade_drive(y, rot, false);
        }

        Ok(())
    }

    // ---- TRACE ----

    /// Report the state a sequencer ran this tick.
    pub fn trace_state_info(&mut self, sequencer: &str, state: &str) {
        let pose = self.drive_base.get_pose();

        self.trace.state_info(&StateTrace {
            elapsed_s: self.elapsed_s,
            sequencer: sequencer.to_string(),
            state: state.to_string(),
            x: pose.x,
            y: pose.y,
            heading_deg: pose.heading_deg,
            target_heading_deg: self.target_heading,
        });
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::drive_base::{DriveBaseParams, KinematicsParams};
    use crate::pid::PidParams;
    use crate::pid_drive::PidDriveParams;
    use crate::sched::{Event, Timer};
    use crate::sim::{SimRig, SimRigParams};
    use crate::trace::LogTraceSink;

    fn robot() -> (SimRig, Robot) {
        let rig = SimRig::new(&SimRigParams::default());
        let robot = rig
            .robot(
                &DriveBaseParams::new(KinematicsParams::Mecanum),
                &PidParams::p_only(0.02, 0.5),
                &PidDriveParams {
                    y: Some(PidParams::p_only(0.05, 0.5)),
                    ..Default::default()
                },
                Box::new(LogTraceSink),
            )
            .unwrap();
        (rig, robot)
    }

    #[test]
    fn test_manual_drive_guard() {
        let (_, mut robot) = robot();

        robot.manual_drive(0.0, 0.5, 0.0).unwrap();
        assert_eq!(robot.drive_base.wheel_powers(), [0.5; 4]);

        robot.set_autonomous_active(true);
        assert!(matches!(
            robot.manual_drive(0.0, 1.0, 0.0),
            Err(RobotError::AutonomousActive)
        ));
        assert_eq!(robot.drive_base.wheel_powers(), [0.5; 4]);

        robot.stop_mode();
        assert!(!robot.is_autonomous_active());
        assert_eq!(robot.drive_base.wheel_powers(), [0.0; 4]);
    }

    #[test]
    fn test_tick_runs_timers_and_odometry() {
        let (rig, mut robot) = robot();
        let event = Event::new("delay");
        let mut timer = Timer::new("delay", &robot.ctx);

        robot.start_mode();
        timer.set(0.09, &event);
        robot.manual_drive(0.0, 1.0, 0.0).unwrap();

        for i in 1..=5 {
            rig.step(0.02);
            robot.pre_periodic(i as f64 * 0.02);
            robot.post_periodic().unwrap();
        }

        assert!(event.is_signaled());
        assert!((robot.dt() - 0.02).abs() < 1e-12);
        assert!((robot.drive_base.get_y_position() - 10.0).abs() < 1e-9);
    }
}
