//! Kinematic models of the drive base

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Rotation2, Vector2};
use serde::Serialize;

use super::{DriveBaseError, KinematicsParams, NUM_WHEELS};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Geometry of a swerve drive base.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwerveGeometry {
    /// Distance between the left and right modules
    pub width: f64,

    /// Distance between the front and rear modules
    pub length: f64,

    /// Wheelbase diagonal, `sqrt(width^2 + length^2)`
    pub diagonal: f64,
}

/// Outputs for every wheel, produced from one drive command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WheelCommands {
    /// Power fraction of each wheel in `[-1, 1]`.
    pub powers: [f64; NUM_WHEELS],

    /// Steering angle of each wheel in `[0, 360)`, swerve only.
    ///
    /// `None` for a swerve base when the command is zero, in which case the
    /// modules keep their current angles.
    pub steer_angles_deg: Option<[f64; NUM_WHEELS]>,
}

/// Wheel motion since the previous odometry update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelDeltas {
    /// Encoder change of each wheel, polarity already applied.
    pub distances: [f64; NUM_WHEELS],

    /// Measured steering angle of each wheel, swerve only.
    pub steer_angles_deg: Option<[f64; NUM_WHEELS]>,
}

/// Robot-frame motion over one tick, in encoder units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PoseDelta {
    pub x: f64,
    pub y: f64,
    pub rot: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The kinematic model of a drive base.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriveKinematics {
    Tank,
    Mecanum,
    Swerve(SwerveGeometry),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveKinematics {
    /// Build the kinematics from parameters, validating swerve geometry.
    pub fn from_params(params: &KinematicsParams) -> Result<Self, DriveBaseError> {
        match *params {
            KinematicsParams::Tank => Ok(Self::Tank),
            KinematicsParams::Mecanum => Ok(Self::Mecanum),
            KinematicsParams::Swerve { width, length } => {
                if !(width > 0.0 && length > 0.0) {
                    return Err(DriveBaseError::InvalidGeometry { width, length });
                }

                Ok(Self::Swerve(SwerveGeometry {
                    width,
                    length,
                    diagonal: width.hypot(length),
                }))
            }
        }
    }

    /// True for models capable of independent translation and rotation.
    pub fn is_holonomic(&self) -> bool {
        !matches!(self, Self::Tank)
    }

    /// Default degrees of rotation per unit of odometry rotation.
    pub fn default_rot_scale(&self, y_scale: f64) -> f64 {
        match self {
            // Each module travels pi * diagonal distance units per turn
            Self::Swerve(g) => y_scale * 360.0 / (std::f64::consts::PI * g.diagonal),
            _ => 1.0,
        }
    }

    /// Convert a command into wheel outputs.
    ///
    /// `(x, y)` are rotated from the field into the robot frame using
    /// `heading_deg` (pass zero for robot-frame commands). Tank kinematics
    /// ignore `x` and the heading and behave as an arcade drive of `y` and
    /// `rot`. Wheel powers are scaled down jointly so that none exceeds unit
    /// magnitude.
    pub fn compute_wheel_outputs(&self, x: f64, y: f64, rot: f64, heading_deg: f64) -> WheelCommands {
        match self {
            Self::Tank => WheelCommands {
                powers: Self::tank_wheel_powers(y, rot),
                steer_angles_deg: None,
            },
            Self::Mecanum => {
                let (x1, y1) = field_to_robot(x, y, heading_deg);
                WheelCommands {
                    powers: Self::mecanum_wheel_powers(x1, y1, rot),
                    steer_angles_deg: None,
                }
            }
            Self::Swerve(g) => {
                let (x1, y1) = field_to_robot(x, y, heading_deg);
                Self::swerve_wheel_outputs(g, x1, y1, rot)
            }
        }
    }

    /// Robot-frame motion corresponding to the wheel motion.
    pub fn odometry_delta(&self, deltas: &WheelDeltas) -> PoseDelta {
        match self {
            Self::Tank => Self::tank_odometry(&deltas.distances),
            Self::Mecanum => Self::mecanum_odometry(&deltas.distances),
            Self::Swerve(g) => {
                // Without steering angles assume the modules point forward
                let angles = deltas.steer_angles_deg.unwrap_or([0.0; NUM_WHEELS]);
                Self::swerve_odometry(g, &deltas.distances, &angles)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Rotate a field-frame vector into the frame of a robot at `heading_deg`.
///
/// Gives `x1 = x cos(h) - y sin(h)`, `y1 = x sin(h) + y cos(h)`.
pub fn field_to_robot(x: f64, y: f64, heading_deg: f64) -> (f64, f64) {
    if heading_deg == 0.0 {
        return (x, y);
    }

    let v = Rotation2::new(heading_deg.to_radians()) * Vector2::new(x, y);
    (v.x, v.y)
}
