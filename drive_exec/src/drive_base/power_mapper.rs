//! Motor power shaping

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use util::maths::{clip_unit, lin_map};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Maps a desired output fraction into the command sent to a wheel.
///
/// Called for every wheel, whatever the kinematic model.
pub trait MotorPowerMapper {
    /// Translate `power` for a wheel currently moving at `speed` encoder
    /// units per second.
    fn translate_motor_power(&self, power: f64, speed: f64) -> f64;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of a linear motor torque/speed curve.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TorqueCurveParams {
    /// Encoder counts per wheel revolution
    pub counts_per_rev: f64,

    /// Motor revolutions per wheel revolution
    pub gear_ratio: f64,

    /// Radius of the wheel
    pub wheel_radius: f64,

    /// Motor torque at zero speed
    pub stall_torque: f64,

    /// Motor speed at zero torque
    ///
    /// Units: revolutions/minute
    pub free_speed_rpm: f64,

    /// Wheel force corresponding to a power of one
    pub max_force: f64,
}

/// Interprets the power as a fraction of the maximum wheel force, and
/// converts it into the output fraction that produces that force at the
/// wheel's current speed.
#[derive(Debug, Clone)]
pub struct TorqueCurveMapper {
    params: TorqueCurveParams,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TorqueCurveMapper {
    pub fn new(params: TorqueCurveParams) -> Self {
        Self { params }
    }

    /// Torque available from the motor at `motor_rpm`.
    fn max_torque(&self, motor_rpm: f64) -> f64 {
        lin_map(
            (0.0, self.params.free_speed_rpm),
            (self.params.stall_torque, 0.0),
            motor_rpm,
        )
        .max(1e-6)
    }
}

impl MotorPowerMapper for TorqueCurveMapper {
    fn translate_motor_power(&self, power: f64, speed: f64) -> f64 {
        let p = &self.params;

        let wheel_rpm = speed.abs() / p.counts_per_rev * 60.0;
        let motor_rpm = wheel_rpm * p.gear_ratio;

        let desired_torque = power * p.max_force * p.wheel_radius / p.gear_ratio;

        clip_unit(desired_torque / self.max_torque(motor_rpm))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn mapper() -> TorqueCurveMapper {
        TorqueCurveMapper::new(TorqueCurveParams {
            counts_per_rev: 60.0,
            gear_ratio: 2.0,
            wheel_radius: 1.0,
            stall_torque: 100.0,
            free_speed_rpm: 1000.0,
            max_force: 200.0,
        })
    }

    #[test]
    fn test_torque_curve() {
        let m = mapper();

        // At stall all torque is available
        assert!((m.translate_motor_power(0.5, 0.0) - 0.5).abs() < 1e-12);
        assert!((m.translate_motor_power(-0.5, 0.0) + 0.5).abs() < 1e-12);

        // At half the free speed only half the torque is left, 250 counts/s
        // is 250 wheel rpm and 500 motor rpm
        assert!((m.translate_motor_power(0.25, 250.0) - 0.5).abs() < 1e-12);
        assert!((m.translate_motor_power(0.25, -250.0) - 0.5).abs() < 1e-12);

        // Beyond the free speed the output saturates
        assert_eq!(m.translate_motor_power(0.1, 10_000.0), 1.0);
    }
}
