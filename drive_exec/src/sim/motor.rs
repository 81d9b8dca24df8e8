//! Simulated motor

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::cell::RefCell;
use std::rc::Rc;
use util::maths::clip_unit;

use crate::actuator::Actuator;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An ideal motor whose speed is proportional to its applied power.
///
/// Clones are handles onto the same motor, so a test or [`super::SimRig`] can
/// keep one while the drive base owns another.
#[derive(Debug, Clone)]
pub struct SimMotor {
    state: Rc<RefCell<MotorState>>,
}

#[derive(Debug)]
struct MotorState {
    /// Sensor units per second at full power
    full_speed: f64,

    /// Value last passed to `set`
    commanded: f64,

    /// Power actually applied after inversion and soft limits
    applied: f64,

    /// Position of the motor shaft, in sensor units
    raw_position: f64,

    /// Software zero offset
    offset: f64,

    /// Speed of the motor shaft, in sensor units per second
    raw_speed: f64,

    inverted: bool,
    sensor_inverted: bool,
    brake: bool,

    lower_limit_switch: Option<f64>,
    upper_limit_switch: Option<f64>,

    soft_lower: Option<f64>,
    soft_upper: Option<f64>,
    soft_lower_enabled: bool,
    soft_upper_enabled: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimMotor {
    /// Create a motor which moves `full_speed` sensor units per second at
    /// full power.
    pub fn new(full_speed: f64) -> Self {
        Self {
            state: Rc::new(RefCell::new(MotorState {
                full_speed,
                commanded: 0.0,
                applied: 0.0,
                raw_position: 0.0,
                offset: 0.0,
                raw_speed: 0.0,
                inverted: false,
                sensor_inverted: false,
                brake: false,
                lower_limit_switch: None,
                upper_limit_switch: None,
                soft_lower: None,
                soft_upper: None,
                soft_lower_enabled: false,
                soft_upper_enabled: false,
            })),
        }
    }

    /// Add limit switches which trip at the given raw positions.
    pub fn with_limit_switches(self, lower: f64, upper: f64) -> Self {
        {
            let mut s = self.state.borrow_mut();
            s.lower_limit_switch = Some(lower);
            s.upper_limit_switch = Some(upper);
        }
        self
    }

    /// Integrate the applied power over `dt` seconds.
    pub fn step(&self, dt: f64) {
        let mut s = self.state.borrow_mut();
        s.raw_speed = s.applied * s.full_speed;
        s.raw_position += s.raw_speed * dt;
    }

    /// Move the shaft directly, as if driven by an external force.
    pub fn add_raw_position(&self, delta: f64) {
        self.state.borrow_mut().raw_position += delta;
    }

    pub fn raw_position(&self) -> f64 {
        self.state.borrow().raw_position
    }

    /// Power applied to the shaft after inversion and soft limits.
    pub fn applied_power(&self) -> f64 {
        self.state.borrow().applied
    }

    pub fn is_brake_mode_enabled(&self) -> bool {
        self.state.borrow().brake
    }
}

impl MotorState {
    fn sensor_sign(&self) -> f64 {
        if self.sensor_inverted {
            -1.0
        } else {
            1.0
        }
    }

    fn position(&self) -> f64 {
        self.sensor_sign() * (self.raw_position - self.offset)
    }
}

impl Actuator for SimMotor {
    fn get_position(&self) -> f64 {
        self.state.borrow().position()
    }

    fn get_speed(&self) -> f64 {
        let s = self.state.borrow();
        s.sensor_sign() * s.raw_speed
    }

    fn get_power(&self) -> f64 {
        self.state.borrow().commanded
    }

    fn set(&mut self, value: f64) {
        let mut s = self.state.borrow_mut();
        let value = clip_unit(value);
        s.commanded = value;

        let mut applied = if s.inverted { -value } else { value };

        // Soft limits act on the sensor reading
        let pos = s.position();
        let dir = applied * s.sensor_sign();
        if let (true, Some(upper)) = (s.soft_upper_enabled, s.soft_upper) {
            if pos >= upper && dir > 0.0 {
                applied = 0.0;
            }
        }
        if let (true, Some(lower)) = (s.soft_lower_enabled, s.soft_lower) {
            if pos <= lower && dir < 0.0 {
                applied = 0.0;
            }
        }

        s.applied = applied;
    }

    fn reset_position(&mut self, hardware: bool) {
        let mut s = self.state.borrow_mut();
        if hardware {
            s.raw_position = 0.0;
            s.offset = 0.0;
        } else {
            s.offset = s.raw_position;
        }
    }

    fn get_inverted(&self) -> bool {
        self.state.borrow().inverted
    }

    fn set_inverted(&mut self, inverted: bool) {
        self.state.borrow_mut().inverted = inverted;
    }

    fn set_position_sensor_inverted(&mut self, inverted: bool) {
        self.state.borrow_mut().sensor_inverted = inverted;
    }

    fn set_brake_mode_enabled(&mut self, enabled: bool) {
        self.state.borrow_mut().brake = enabled;
    }

    fn is_lower_limit_switch_active(&self) -> bool {
        let s = self.state.borrow();
        matches!(s.lower_limit_switch, Some(l) if s.raw_position <= l)
    }

    fn is_upper_limit_switch_active(&self) -> bool {
        let s = self.state.borrow();
        matches!(s.upper_limit_switch, Some(u) if s.raw_position >= u)
    }

    fn set_soft_limit_enabled(&mut self, lower: bool, upper: bool) {
        let mut s = self.state.borrow_mut();
        s.soft_lower_enabled = lower;
        s.soft_upper_enabled = upper;
    }

    fn set_soft_lower_limit(&mut self, position: f64) {
        self.state.borrow_mut().soft_lower = Some(position);
    }

    fn set_soft_upper_limit(&mut self, position: f64) {
        self.state.borrow_mut().soft_upper = Some(position);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_integration_and_inversion() {
        let mut motor = SimMotor::new(10.0);
        let handle = motor.clone();

        motor.set(0.5);
        handle.step(1.0);
        assert_eq!(motor.get_position(), 5.0);
        assert_eq!(motor.get_speed(), 5.0);

        motor.set_inverted(true);
        motor.set(0.5);
        assert_eq!(motor.get_power(), 0.5);
        assert_eq!(handle.applied_power(), -0.5);

        motor.set_position_sensor_inverted(true);
        assert_eq!(motor.get_position(), -5.0);

        motor.reset_position(false);
        assert_eq!(motor.get_position(), 0.0);
        assert_eq!(handle.raw_position(), 5.0);
    }

    #[test]
    fn test_limits() {
        let mut motor = SimMotor::new(10.0).with_limit_switches(0.0, 10.0);
        assert!(motor.is_lower_limit_switch_active());

        motor.set_soft_upper_limit(3.0);
        motor.set_soft_limit_enabled(false, true);
        motor.add_raw_position(4.0);
        motor.set(1.0);
        assert_eq!(motor.applied_power(), 0.0);
        motor.set(-1.0);
        assert_eq!(motor.applied_power(), -1.0);

        motor.add_raw_position(10.0);
        assert!(motor.is_upper_limit_switch_active());
    }
}
