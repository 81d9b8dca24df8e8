//! # Actuator interface
//!
//! The contract between the drive code and a single axis motor controller.
//! Hardware drivers live outside this library, [`crate::sim::SimMotor`] is
//! provided for tests and the simulated executive.

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A single axis actuator with position and speed feedback.
///
/// Not every method is meaningful for every physical role. Implementations
/// for which a method makes no sense (e.g. a limit switch on a continuously
/// rotating drive wheel) shall raise an unrecoverable error rather than
/// return a made-up value.
pub trait Actuator {
    /// Position in sensor units, relative to the last reset.
    fn get_position(&self) -> f64;

    /// Speed in sensor units per second.
    fn get_speed(&self) -> f64;

    /// The last value passed to `set`.
    fn get_power(&self) -> f64;

    /// Command the actuator with a power or velocity fraction in `[-1, 1]`.
    fn set(&mut self, value: f64);

    /// Zero the position. If `hardware` is set the reset is performed in the
    /// motor controller, otherwise a software offset is used.
    fn reset_position(&mut self, hardware: bool);

    fn get_inverted(&self) -> bool;

    fn set_inverted(&mut self, inverted: bool);

    fn set_position_sensor_inverted(&mut self, inverted: bool);

    fn set_brake_mode_enabled(&mut self, enabled: bool);

    fn is_lower_limit_switch_active(&self) -> bool;

    fn is_upper_limit_switch_active(&self) -> bool;

    fn set_soft_limit_enabled(&mut self, lower: bool, upper: bool);

    fn set_soft_lower_limit(&mut self, position: f64);

    fn set_soft_upper_limit(&mut self, position: f64);
}
