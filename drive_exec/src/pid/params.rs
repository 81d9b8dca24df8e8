//! Parameters for a single axis PID controller

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gains and limits of a PID controller.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PidParams {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,

    /// Feed-forward gain, applied to the setpoint
    pub k_f: f64,

    /// Error magnitude at or below which the loop is on target.
    pub tolerance: f64,

    /// Lowest output value
    pub output_min: f64,

    /// Highest output value
    pub output_max: f64,

    /// Negate the output after clamping, used to match actuator wiring
    /// polarity without changing gain signs.
    pub inverted: bool,

    /// If true targets are compared directly with the input, otherwise a
    /// target is a delta from the input at the time it is set.
    pub absolute_setpoint: bool,

    /// If true the error is wrapped into `[-180, 180)` degrees.
    pub angular: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for PidParams {
    fn default() -> Self {
        Self {
            k_p: 0.0,
            k_i: 0.0,
            k_d: 0.0,
            k_f: 0.0,
            tolerance: 0.0,
            output_min: -1.0,
            output_max: 1.0,
            inverted: false,
            absolute_setpoint: false,
            angular: false,
        }
    }
}

impl PidParams {
    /// Proportional only parameters with unit output limits.
    pub fn p_only(k_p: f64, tolerance: f64) -> Self {
        Self {
            k_p,
            tolerance,
            ..Default::default()
        }
    }

    /// Parameters for a heading loop: absolute setpoint, wrapped error.
    pub fn heading(k_p: f64, tolerance: f64) -> Self {
        Self {
            absolute_setpoint: true,
            angular: true,
            ..Self::p_only(k_p, tolerance)
        }
    }

    /// True if every coefficient is zero.
    pub fn is_zero(&self) -> bool {
        self.k_p == 0.0 && self.k_i == 0.0 && self.k_d == 0.0 && self.k_f == 0.0
    }
}
