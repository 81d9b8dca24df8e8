//! # Feedback controller
//!
//! A generic single axis PID loop with tolerance based on-target detection.
//! The controller is sampled by its owner once per tick with the current
//! input and the tick period, it keeps no notion of wall-clock time.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use serde::Serialize;
use util::maths::{clamp, wrap_180};

pub use params::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Single axis PID controller.
#[derive(Debug, Clone, Serialize)]
pub struct PidController {
    /// Name used in log messages
    name: String,

    #[serde(skip)]
    params: PidParams,

    /// Current setpoint, in input units
    setpoint: f64,

    /// The integral accumulation
    integral: f64,

    /// Previous error
    prev_error: Option<f64>,

    /// Error computed by the last call to `compute`
    error: f64,

    /// Last input value
    input: f64,

    /// Last (clamped and possibly inverted) output
    output: f64,

    /// True if the last error was within tolerance
    on_target: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {
    /// Create a new controller with the given parameters.
    pub fn new(name: &str, params: PidParams) -> Self {
        let mut params = params;

        // Keep the output range ordered so clamping is well defined
        if params.output_min > params.output_max {
            std::mem::swap(&mut params.output_min, &mut params.output_max);
        }

        Self {
            name: name.to_string(),
            params,
            setpoint: 0.0,
            integral: 0.0,
            prev_error: None,
            error: 0.0,
            input: 0.0,
            output: 0.0,
            on_target: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &PidParams {
        &self.params
    }

    /// Set a new target.
    ///
    /// In relative mode the setpoint becomes `current_input + target`,
    /// otherwise `target` itself. The integral accumulator and error history
    /// are reset.
    pub fn set_target(&mut self, target: f64, current_input: f64) {
        self.setpoint = if self.params.absolute_setpoint {
            target
        } else {
            current_input + target
        };

        self.integral = 0.0;
        self.prev_error = None;
        self.input = current_input;
        self.error = self.calc_error(current_input);
        self.on_target = self.params.is_zero() || self.error.abs() <= self.params.tolerance;

        trace!(
            "[{}] target {:.3} (input {:.3}) -> setpoint {:.3}",
            self.name,
            target,
            current_input,
            self.setpoint
        );
    }

    /// Run the loop for one tick, returning the clamped output.
    ///
    /// `dt` is the time since the previous call. A non-positive `dt` disables
    /// the derivative and integral terms for this call.
    pub fn compute(&mut self, input: f64, dt: f64) -> f64 {
        let error = self.calc_error(input);

        // Proportional
        let p = self.params.k_p * error;

        // Integral, accumulator limited so the integral term alone can never
        // exceed the output range
        if self.params.k_i != 0.0 && dt > 0.0 {
            self.integral += error * dt;

            let lim_a = self.params.output_min / self.params.k_i;
            let lim_b = self.params.output_max / self.params.k_i;
            self.integral = clamp(&self.integral, &lim_a.min(lim_b), &lim_a.max(lim_b));
        }
        let i = self.params.k_i * self.integral;

        // Derivative
        let d = match self.prev_error {
            Some(prev) if dt > 0.0 => self.params.k_d * (error - prev) / dt,
            _ => 0.0,
        };

        // Feed forward
        let f = self.params.k_f * self.setpoint;

        let mut output = clamp(
            &(p + i + d + f),
            &self.params.output_min,
            &self.params.output_max,
        );
        if self.params.inverted {
            output = -output;
        }

        self.prev_error = Some(error);
        self.error = error;
        self.input = input;
        self.output = output;
        self.on_target = self.params.is_zero() || error.abs() <= self.params.tolerance;

        output
    }

    /// True if the error was within tolerance at the last update.
    ///
    /// A controller with all coefficients zero is always on target.
    pub fn is_on_target(&self) -> bool {
        self.params.is_zero() || self.on_target
    }

    pub fn get_error(&self) -> f64 {
        self.error
    }

    /// The absolute setpoint, in input units.
    pub fn get_target(&self) -> f64 {
        self.setpoint
    }

    pub fn get_output(&self) -> f64 {
        self.output
    }

    pub fn get_input(&self) -> f64 {
        self.input
    }

    /// Clear the accumulated state, leaving the setpoint untouched.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = None;
        self.output = 0.0;
        self.on_target = false;
    }

    /// Limit the output to `[-mag, mag]`.
    pub fn set_output_limit(&mut self, mag: f64) {
        let mag = mag.abs();
        self.set_output_range(-mag, mag);
    }

    /// Limit the output to `[min, max]`.
    pub fn set_output_range(&mut self, min: f64, max: f64) {
        self.params.output_min = min.min(max);
        self.params.output_max = min.max(max);
    }

    pub fn set_inverted(&mut self, inverted: bool) {
        self.params.inverted = inverted;
    }

    pub fn set_absolute_setpoint(&mut self, absolute: bool) {
        self.params.absolute_setpoint = absolute;
    }

    fn calc_error(&self, input: f64) -> f64 {
        let error = self.setpoint - input;

        if self.params.angular {
            wrap_180(error)
        } else {
            error
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_compute_idempotent_under_fixed_error() {
        let mut pid = PidController::new(
            "p",
            PidParams {
                k_p: 0.1,
                k_f: 0.01,
                ..Default::default()
            },
        );
        pid.set_target(5.0, 0.0);

        let first = pid.compute(1.0, 0.02);
        for _ in 0..10 {
            assert_eq!(pid.compute(1.0, 0.02), first);
        }
        assert!((first - (0.4 + 0.05)).abs() < 1e-12);
    }

    #[test]
    fn test_relative_and_absolute_setpoints() {
        let mut rel = PidController::new("rel", PidParams::p_only(1.0, 0.5));
        rel.set_target(10.0, 3.0);
        assert_eq!(rel.get_target(), 13.0);

        let mut abs = PidController::new("abs", PidParams::heading(1.0, 0.5));
        abs.set_target(10.0, 3.0);
        assert_eq!(abs.get_target(), 10.0);
    }

    #[test]
    fn test_output_clamped_and_inverted() {
        let mut pid = PidController::new(
            "clamp",
            PidParams {
                k_p: 10.0,
                output_min: -0.5,
                output_max: 0.5,
                ..Default::default()
            },
        );
        pid.set_target(100.0, 0.0);
        assert_eq!(pid.compute(0.0, 0.02), 0.5);

        pid.set_inverted(true);
        assert_eq!(pid.compute(0.0, 0.02), -0.5);

        pid.set_output_limit(0.2);
        assert_eq!(pid.compute(0.0, 0.02), -0.2);
    }

    #[test]
    fn test_on_target_within_tolerance() {
        let mut pid = PidController::new("tol", PidParams::p_only(0.1, 1.0));
        pid.set_target(10.0, 0.0);
        assert!(!pid.is_on_target());

        pid.compute(8.0, 0.02);
        assert!(!pid.is_on_target());
        pid.compute(9.0, 0.02);
        assert!(pid.is_on_target());
        assert_eq!(pid.get_error(), 1.0);
    }

    #[test]
    fn test_zero_coefficients_always_on_target() {
        let mut pid = PidController::new("zero", PidParams::default());
        pid.set_target(100.0, 0.0);
        assert!(pid.is_on_target());
        assert_eq!(pid.compute(0.0, 0.02), 0.0);
        assert!(pid.is_on_target());
    }

    #[test]
    fn test_angular_error_wraps() {
        let mut pid = PidController::new("heading", PidParams::heading(0.01, 1.0));
        pid.set_target(10.0, 350.0);
        pid.compute(350.0, 0.02);
        assert!((pid.get_error() - 20.0).abs() < 1e-9);

        pid.compute(370.0, 0.02);
        assert!(pid.is_on_target());
    }

    #[test]
    fn test_integral_anti_windup() {
        let mut pid = PidController::new(
            "int",
            PidParams {
                k_i: 1.0,
                ..Default::default()
            },
        );
        pid.set_target(100.0, 0.0);

        for _ in 0..1000 {
            pid.compute(0.0, 0.1);
        }
        assert_eq!(pid.get_output(), 1.0);

        // With the accumulator limited the output leaves saturation as soon
        // as the error changes sign
        pid.compute(200.0, 0.1);
        assert!(pid.get_output() < 1.0);
    }
}
