//! # Swerve module
//!
//! One wheel unit of a swerve drive base: a drive actuator and a steering
//! actuator held at an angle by a PID loop. The module is itself an
//! [`Actuator`] whose drive channel passes straight through to the drive
//! motor.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use util::{maths::modulo_360, raise_error};

use crate::actuator::Actuator;
use crate::pid::{PidController, PidParams};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A swerve module.
pub struct SwerveModule {
    name: String,

    /// Drive motor, velocity channel
    drive: Box<dyn Actuator>,

    /// Steering motor, position in degrees
    steer: Box<dyn Actuator>,

    /// Steering loop, absolute setpoint with wrapped error
    steer_pid: PidController,

    /// Steering target in `[0, 360)`
    steer_target_deg: f64,

    /// Keep driving the steering motor once on target
    hold: bool,

    /// True while the steering loop is running
    steering: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SwerveModule {
    /// Create a new module.
    ///
    /// The steering parameters are forced to an absolute, angular loop since
    /// the steering angle is compared directly and wraps at 360 degrees.
    pub fn new(
        name: &str,
        drive: Box<dyn Actuator>,
        steer: Box<dyn Actuator>,
        steer_params: &PidParams,
    ) -> Self {
        let params = PidParams {
            absolute_setpoint: true,
            angular: true,
            ..*steer_params
        };

        Self {
            name: name.to_string(),
            drive,
            steer,
            steer_pid: PidController::new(&format!("{}.steer", name), params),
            steer_target_deg: 0.0,
            hold: false,
            steering: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Steer the module to `angle_deg`, reduced into `[0, 360)`.
    ///
    /// If `hold` is set the steering loop keeps running once on target,
    /// otherwise the steering motor is released.
    pub fn set_steer_angle(&mut self, angle_deg: f64, hold: bool) {
        let angle = modulo_360(angle_deg);
        let current = self.get_steer_angle();

        self.steer_target_deg = angle;
        self.hold = hold;
        self.steering = true;
        self.steer_pid.set_target(angle, current);

        trace!("[{}] steer to {:.2} deg (hold: {})", self.name, angle, hold);
    }

    /// Measured steering angle in `[0, 360)`.
    pub fn get_steer_angle(&self) -> f64 {
        modulo_360(self.steer.get_position())
    }

    /// Commanded steering angle in `[0, 360)`.
    pub fn get_steer_target(&self) -> f64 {
        self.steer_target_deg
    }

    /// True if the steering loop is within tolerance of its target.
    pub fn is_steer_on_target(&self) -> bool {
        self.steer_pid.is_on_target()
    }

    /// Run the steering loop for one tick.
    pub fn update_steering(&mut self, dt: f64) {
        if !self.steering {
            return;
        }

        let output = self.steer_pid.compute(self.get_steer_angle(), dt);

        if self.steer_pid.is_on_target() && !self.hold {
            self.steer.set(0.0);
            self.steering = false;
        } else {
            self.steer.set(output);
        }
    }

    /// Zero the drive encoder and, if `reset_steer` is set, the steering
    /// encoder as well.
    pub fn reset_position_with_steer(&mut self, hardware: bool, reset_steer: bool) {
        self.drive.reset_position(hardware);

        if reset_steer {
            self.steer.reset_position(hardware);
        }
    }

    /// Declare the current steering position as zero degrees and stop
    /// steering.
    pub fn zero_calibrate_steering(&mut self) {
        self.steer.set(0.0);
        self.steer.reset_position(true);
        self.steer_target_deg = 0.0;
        self.steer_pid.set_target(0.0, 0.0);
        self.steering = false;
    }

    /// Stop both motors.
    pub fn stop(&mut self) {
        self.drive.set(0.0);
        self.steer.set(0.0);
        self.steering = false;
    }
}

impl Actuator for SwerveModule {
    fn get_position(&self) -> f64 {
        self.drive.get_position()
    }

    fn get_speed(&self) -> f64 {
        self.drive.get_speed()
    }

    fn get_power(&self) -> f64 {
        self.drive.get_power()
    }

    fn set(&mut self, value: f64) {
        self.drive.set(value)
    }

    fn reset_position(&mut self, hardware: bool) {
        self.reset_position_with_steer(hardware, false)
    }

    fn get_inverted(&self) -> bool {
        self.drive.get_inverted()
    }

    fn set_inverted(&mut self, inverted: bool) {
        self.drive.set_inverted(inverted)
    }

    fn set_position_sensor_inverted(&mut self, inverted: bool) {
        self.drive.set_position_sensor_inverted(inverted)
    }

    fn set_brake_mode_enabled(&mut self, enabled: bool) {
        self.drive.set_brake_mode_enabled(enabled)
    }

    fn is_lower_limit_switch_active(&self) -> bool {
        raise_error!("[{}] Swerve drive wheels have no lower limit switch", self.name)
    }

    fn is_upper_limit_switch_active(&self) -> bool {
        raise_error!("[{}] Swerve drive wheels have no upper limit switch", self.name)
    }

    fn set_soft_limit_enabled(&mut self, _lower: bool, _upper: bool) {
        raise_error!("[{}] Swerve drive wheels have no soft limits", self.name)
    }

    fn set_soft_lower_limit(&mut self, _position: f64) {
        raise_error!("[{}] Swerve drive wheels have no soft limits", self.name)
    }

    fn set_soft_upper_limit(&mut self, _position: f64) {
        raise_error!("[{}] Swerve drive wheels have no soft limits", self.name)
    }
}

impl std::fmt::Debug for SwerveModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwerveModule")
            .field("name", &self.name)
            .field("steer_target_deg", &self.steer_target_deg)
            .field("steer_angle_deg", &self.get_steer_angle())
            .field("drive_power", &self.drive.get_power())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim::SimMotor;

    fn module() -> (SwerveModule, SimMotor, SimMotor) {
        let drive = SimMotor::new(100.0);
        let steer = SimMotor::new(360.0);
        let module = SwerveModule::new(
            "lf",
            Box::new(drive.clone()),
            Box::new(steer.clone()),
            &PidParams::p_only(0.02, 0.5),
        );

        (module, drive, steer)
    }

    #[test]
    fn test_steer_angle_is_normalised() {
        let (mut module, _, steer) = module();

        module.set_steer_angle(450.0, false);
        assert_eq!(module.get_steer_target(), 90.0);

        for _ in 0..500 {
            module.update_steering(0.02);
            steer.step(0.02);
        }

        assert!((module.get_steer_angle() - 90.0).abs() <= 0.5);
        assert!(module.is_steer_on_target());

        // Released once on target without hold
        assert_eq!(steer.applied_power(), 0.0);
    }

    #[test]
    fn test_steer_takes_shortest_path() {
        let (mut module, _, steer) = module();

        module.set_steer_angle(-30.0, true);
        assert_eq!(module.get_steer_target(), 330.0);

        module.update_steering(0.02);
        assert!(steer.applied_power() < 0.0);
    }

    #[test]
    fn test_drive_channel_passes_through() {
        let (mut module, drive, _) = module();

        module.set(0.75);
        drive.step(1.0);
        assert_eq!(module.get_power(), 0.75);
        assert_eq!(module.get_position(), 75.0);
        assert_eq!(module.get_speed(), 75.0);

        module.reset_position(false);
        assert_eq!(module.get_position(), 0.0);
    }

    #[test]
    fn test_zero_calibrate_steering() {
        let (mut module, _, steer) = module();

        steer.add_raw_position(42.0);
        module.zero_calibrate_steering();
        assert_eq!(module.get_steer_angle(), 0.0);
    }

    #[test]
    #[should_panic]
    fn test_limit_switch_query_is_fatal() {
        let (module, _, _) = module();
        module.is_lower_limit_switch_active();
    }

    #[test]
    #[should_panic]
    fn test_soft_limit_config_is_fatal() {
        let (mut module, _, _) = module();
        module.set_soft_upper_limit(10.0);
    }
}
