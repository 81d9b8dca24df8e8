//! # Simulated collaborators
//!
//! Ideal motors, sensors and mechanisms standing in for hardware drivers.
//! They are used by the unit tests and by the simulated executive.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod mechanisms;
mod motor;
mod sensors;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::drive_base::{
    DriveBase, DriveBaseParams, KinematicsParams, WheelSet, LF, LR, NUM_WHEELS, RF, RR,
};
use crate::pid::PidParams;
use crate::pid_drive::{PidDrive, PidDriveParams};
use crate::robot::{Robot, RobotError};
use crate::sched::TaskContext;
use crate::swerve_module::SwerveModule;
use crate::trace::TraceSink;

pub use mechanisms::*;
pub use motor::*;
pub use sensors::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the simulated rig.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SimRigParams {
    /// Wheel encoder units per second at full power
    pub wheel_full_speed: f64,

    /// Steering degrees per second at full power
    pub steer_full_speed: f64,

    /// Mechanism timings
    #[serde(default)]
    pub mech: SimMechParams,
}

/// Handles onto every simulated device of a robot.
///
/// The rig has no gyro, heading comes from the wheel encoders.
#[derive(Debug, Clone)]
pub struct SimRig {
    pub wheels: [SimMotor; NUM_WHEELS],
    pub steers: [SimMotor; NUM_WHEELS],
    pub detector: SimTargetDetector,
    pub elevator: SimElevator,
    pub grabber: SimGrabber,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SimRigParams {
    fn default() -> Self {
        Self {
            wheel_full_speed: 100.0,
            steer_full_speed: 360.0,
            mech: SimMechParams::default(),
        }
    }
}

impl SimRig {
    pub fn new(params: &SimRigParams) -> Self {
        let motors = |speed: f64| {
            [
                SimMotor::new(speed),
                SimMotor::new(speed),
                SimMotor::new(speed),
                SimMotor::new(speed),
            ]
        };

        Self {
            wheels: motors(params.wheel_full_speed),
            steers: motors(params.steer_full_speed),
            detector: SimTargetDetector::new(),
            elevator: SimElevator::new(&params.mech),
            grabber: SimGrabber::new(&params.mech),
        }
    }

    /// Advance every motor by `dt` seconds.
    pub fn step(&self, dt: f64) {
        for m in self.wheels.iter().chain(self.steers.iter()) {
            m.step(dt);
        }
    }

    /// Wheels for the given kinematics, backed by this rig's motors.
    pub fn wheel_set(&self, kinematics: &KinematicsParams, steer_params: &PidParams) -> WheelSet {
        let drive = |i: usize| self.wheels[i].clone();

        match kinematics {
            KinematicsParams::Swerve { .. } => {
                let module = |i: usize, name: &str| {
                    SwerveModule::new(
                        name,
                        Box::new(drive(i)),
                        Box::new(self.steers[i].clone()),
                        steer_params,
                    )
                };

                WheelSet::Swerve([
                    module(LF, "lf"),
                    module(RF, "rf"),
                    module(LR, "lr"),
                    module(RR, "rr"),
                ])
            }
            _ => WheelSet::Fixed([
                Box::new(drive(LF)),
                Box::new(drive(RF)),
                Box::new(drive(LR)),
                Box::new(drive(RR)),
            ]),
        }
    }

    /// Build a drive base on this rig.
    pub fn drive_base(
        &self,
        params: &DriveBaseParams,
        steer_params: &PidParams,
    ) -> Result<DriveBase, RobotError> {
        Ok(DriveBase::new(
            params,
            self.wheel_set(&params.kinematics, steer_params),
            None,
        )?)
    }

    /// Build a complete robot on this rig.
    pub fn robot(
        &self,
        drive_params: &DriveBaseParams,
        steer_params: &PidParams,
        pid_drive_params: &PidDriveParams,
        trace: Box<dyn TraceSink>,
    ) -> Result<Robot, RobotError> {
        Ok(Robot::new(
            TaskContext::new(),
            self.drive_base(drive_params, steer_params)?,
            PidDrive::new("pid_drive", pid_drive_params),
            Box::new(self.elevator.clone()),
            Box::new(self.grabber.clone()),
            Box::new(self.detector.clone()),
            trace,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::trace::LogTraceSink;

    #[test]
    fn test_rig_heading_from_wheels() {
        let rig = SimRig::new(&SimRigParams::default());
        let mut robot = rig
            .robot(
                &DriveBaseParams::new(KinematicsParams::Mecanum),
                &PidParams::p_only(0.02, 0.5),
                &PidDriveParams::default(),
                Box::new(LogTraceSink),
            )
            .unwrap();
        robot.start_mode();

        // Turn in place, each wheel moves one unit per tick
        robot.manual_drive(0.0, 0.0, 0.5).unwrap();
        for n in 1..=10 {
            rig.step(0.02);
            robot.pre_periodic(n as f64 * 0.02);
        }

        let pose = robot.drive_base.get_pose();
        assert!((pose.heading_deg - 10.0).abs() < 1e-9);
        assert!(pose.x.abs() < 1e-9);
        assert!(pose.y.abs() < 1e-9);
        assert!((robot.drive_base.get_turn_rate() - 50.0).abs() < 1e-6);
    }
}
