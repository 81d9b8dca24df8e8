//! Parameters structure for DriveBase

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::{TorqueCurveParams, NUM_WHEELS};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the drive base.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveBaseParams {
    // ---- KINEMATICS ----
    /// The kinematic model and its geometry.
    pub kinematics: KinematicsParams,

    // ---- ODOMETRY ----
    /// Distance per encoder unit along the X axis.
    #[serde(default = "unit_scale")]
    pub x_scale: f64,

    /// Distance per encoder unit along the Y axis.
    #[serde(default = "unit_scale")]
    pub y_scale: f64,

    /// Degrees of rotation per encoder unit.
    ///
    /// For swerve bases this defaults to `y_scale * 360 / (pi * diagonal)`,
    /// for the others to 1.
    #[serde(default)]
    pub rot_scale: Option<f64>,

    /// Per-wheel encoder polarity, applied to wheel readings before odometry.
    #[serde(default)]
    pub enc_inverted: [bool; NUM_WHEELS],

    // ---- OPTIONAL FEATURES ----
    /// Gyro assisted turning, enabled at start if present.
    #[serde(default)]
    pub gyro_assist: Option<GyroAssistParams>,

    /// Torque curve motor power mapping, used if present.
    #[serde(default)]
    pub torque_curve: Option<TorqueCurveParams>,
}

/// Gyro assist parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GyroAssistParams {
    /// Turn rate corresponding to a full rotation command.
    ///
    /// Units: degrees/second
    pub max_rotation_rate_degs: f64,

    /// Proportional gain on the turn rate error.
    pub k_p: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The kinematic model of the drive base.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum KinematicsParams {
    /// Differential drive, left and right wheel pairs.
    Tank,

    /// Omnidirectional mecanum wheels.
    Mecanum,

    /// Independently steered wheels.
    Swerve {
        /// Distance between the left and right modules
        width: f64,

        /// Distance between the front and rear modules
        length: f64,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveBaseParams {
    /// Parameters with unit scales, no polarity changes and no optional
    /// features.
    pub fn new(kinematics: KinematicsParams) -> Self {
        Self {
            kinematics,
            x_scale: 1.0,
            y_scale: 1.0,
            rot_scale: None,
            enc_inverted: [false; NUM_WHEELS],
            gyro_assist: None,
            torque_curve: None,
        }
    }
}

fn unit_scale() -> f64 {
    1.0
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load_shipped_params() {
        let params: DriveBaseParams =
            util::params::from_str(include_str!("../../../params/drive_base.toml")).unwrap();

        assert_eq!(params.kinematics, KinematicsParams::Mecanum);
        assert_eq!(params.rot_scale, None);
        assert!(params.gyro_assist.is_none());
    }

    #[test]
    fn test_swerve_params() {
        let params: DriveBaseParams = util::params::from_str(
            r#"
            y_scale = 0.5

            [kinematics]
            type = "Swerve"
            width = 22.0
            length = 28.0
            "#,
        )
        .unwrap();

        assert_eq!(
            params.kinematics,
            KinematicsParams::Swerve {
                width: 22.0,
                length: 28.0
            }
        );
        assert_eq!(params.x_scale, 1.0);
        assert_eq!(params.enc_inverted, [false; 4]);
    }
}
